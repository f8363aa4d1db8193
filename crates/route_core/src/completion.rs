use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use shared::{
    domain::ChatMessage,
    protocol::{ChatCompletionRequest, ChatCompletionResponse},
};
use tracing::{debug, info, warn};

use crate::{config::CompletionConfig, error::ServiceError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 800,
        }
    }
}

/// A single-turn completion: one user message, no prior history.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub params: GenerationParams,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn to_wire(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: vec![ChatMessage::user(self.prompt.clone())],
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            max_tokens: self.params.max_tokens,
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

pub struct AzureCompletionClient {
    http: Client,
    config: CompletionConfig,
}

impl AzureCompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: CompletionConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl CompletionService for AzureCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let url = self
            .config
            .chat_completions_url()
            .map_err(|err| ServiceError::Malformed(err.to_string()))?;
        debug!(
            deployment = %self.config.deployment,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .header("api-key", &self.config.api_key)
            .json(&request.to_wire())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "completion endpoint rejected request");
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let decoded: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|err| ServiceError::Malformed(err.to_string()))?;
        let content = decoded
            .first_content()
            .ok_or_else(|| ServiceError::Malformed("missing choices[0].message.content".into()))?
            .to_string();

        info!(reply_len = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
#[path = "tests/completion_tests.rs"]
mod tests;
