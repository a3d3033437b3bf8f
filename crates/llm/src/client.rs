//! HTTP client for the `/chat/completions` endpoint.
//!
//! Sends the conversation with `stream: true` and hands the event stream to
//! [`crate::sse::fragments`]. Only the connection phase has a timeout; a
//! streaming body may run as long as the model keeps producing text.

use std::time::Duration;

use async_trait::async_trait;
use frontdoor_core::chat::ChatMessage;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::{sse, ChatCompletion, FragmentStream, LlmConfig, LlmError};

/// Streaming chat completion client for one OpenAI-compatible API.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    reasoning_effort: Option<String>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'a str>,
}

impl CompletionClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            reasoning_effort: config.reasoning_effort.clone(),
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reject non-2xx responses, keeping the body text for diagnostics.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatCompletion for CompletionClient {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            stream: true,
            reasoning_effort: self.reasoning_effort.as_deref(),
        };

        tracing::debug!(
            model = %self.model,
            message_count = messages.len(),
            "Requesting chat completion",
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        Ok(sse::fragments(Box::pin(response.bytes_stream())))
    }
}
