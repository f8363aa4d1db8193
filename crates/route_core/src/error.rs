use thiserror::Error;

/// Every way a completion call can fail. All of them surface to the user as
/// the same service error message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("completion endpoint returned status {status}")]
    Status { status: u16 },
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed completion response: {0}")]
    Malformed(String),
}
