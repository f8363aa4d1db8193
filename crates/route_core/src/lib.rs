//! Route form core: address validation, prompt composition, the completion
//! client and the session controller that ties them together.

pub mod completion;
pub mod config;
pub mod error;
pub mod prompt;
pub mod session;
pub mod validator;

pub use completion::{AzureCompletionClient, CompletionRequest, CompletionService, GenerationParams};
pub use config::{load_settings, CompletionConfig, Settings};
pub use error::ServiceError;
pub use session::{RouteSession, SessionState, ShortcutAction, SubmitOutcome, VALIDATION_ERROR_TTL};
