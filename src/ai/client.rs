// HTTP client for the generative prompt service

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use super::types::{MessageRequest, MessageResponse};
use crate::config::AiConfig;

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Error talking to the prompt service. Failures propagate to the caller
/// for user-facing reporting; there is no automatic retry.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Prompt service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Prompt service returned no usable output")]
    EmptyOutput,
    #[error("No API key configured: set ai.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,
}

/// Single-shot client for an Anthropic-style messages endpoint.
pub struct PromptClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl PromptClient {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Result<Self, PromptError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Send one prompt and return the response text. No retry: a failure is
    /// scoped to the user action that issued it.
    pub async fn complete(&self, prompt: &str) -> Result<String, PromptError> {
        let api_key = self.api_key.as_deref().ok_or(PromptError::MissingApiKey)?;
        let request = MessageRequest::new(&self.model, self.max_tokens, prompt);

        tracing::debug!(model = %self.model, "Sending prompt service request");

        let response = self
            .client
            .post(format!("{}{}", self.base_url, MESSAGES_PATH))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::Api { status, body });
        }

        let message: MessageResponse = response.json().await?;
        let text = message.text();
        if text.trim().is_empty() {
            return Err(PromptError::EmptyOutput);
        }

        Ok(text)
    }
}
