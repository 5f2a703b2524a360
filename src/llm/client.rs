//! Chat completion client.

use crate::llm::prompt::{Message, Prompt};
use crate::otel::llm_span;
use crate::types::{DatabaseError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::Instrument;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// API key for the completion service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Whether query generation is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(ApiKey),
    Unconfigured,
}

impl Credential {
    /// Blank or missing keys are treated as unconfigured.
    pub fn from_option(key: Option<String>) -> Self {
        match key {
            Some(key) if !key.trim().is_empty() => Self::Configured(ApiKey::new(key)),
            _ => Self::Unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

/// Text completion service.
///
/// One call, no retries. Implementations surface transport and provider
/// failures as `DatabaseError::ServiceError`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the prompt and return the first completion's raw text.
    async fn complete(&self, prompt: &Prompt, model: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [&'a Message; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    api_key: ApiKey,
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `credential` - Must be `Credential::Configured`
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`
    /// * `timeout` - Transport timeout; `None` waits indefinitely
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::AuthenticationError` for an unconfigured credential,
    /// `DatabaseError::ServiceError` if the HTTP client cannot be built
    pub fn new(credential: Credential, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let api_key = match credential {
            Credential::Configured(key) => key,
            Credential::Unconfigured => {
                return Err(DatabaseError::AuthenticationError(
                    "No API key configured; cannot generate SQL (set OPENAI_API_KEY)".to_string(),
                ))
            }
        };

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt, model: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: prompt.messages(),
        };

        async {
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(self.api_key.expose())
                .json(&request)
                .send()
                .await
                .map_err(|e| DatabaseError::ServiceError(format!("Completion request failed: {}", e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| DatabaseError::ServiceError(format!("Failed to read response: {}", e)))?;

            if !status.is_success() {
                return Err(DatabaseError::ServiceError(format!(
                    "Completion API error {}: {}",
                    status, body
                )));
            }

            let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
                DatabaseError::ServiceError(format!("Failed to parse completion response: {}", e))
            })?;

            let text = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| DatabaseError::ServiceError("No choices in completion response".to_string()))?
                .message
                .content
                .unwrap_or_default();

            tracing::debug!(chars = text.len(), "Received completion");
            Ok(text)
        }
        .instrument(llm_span(model))
        .await
    }
}
