//! LLM Client is the single point of entry for all Claude API calls in this service.
//!
//! No other module may call the Anthropic API directly; the tailoring pipeline only
//! sees the `TextGenerator` trait.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const BASE_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No completion within {0:?}")]
    Timeout(Duration),
}

impl LlmError {
    /// Transport failures, rate limits and upstream 5xx are worth another attempt.
    /// Anything the upstream rejected on its merits is not.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => !e.is_decode() && !e.is_builder(),
            LlmError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Sampling and transport parameters for every generation call.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub deadline: Duration,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_url: config.anthropic_api_url.clone(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            request_timeout: config.llm_request_timeout,
            max_attempts: config.llm_max_retries,
            deadline: config.generation_deadline,
        }
    }
}

/// Anything that turns a prompt into one text completion.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with bounded retry and an overall deadline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    settings: GenerationSettings,
}

impl LlmClient {
    pub fn new(api_key: String, settings: GenerationSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries transient failures with exponential backoff, up to `max_attempts` calls.
    pub async fn call(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(&request_body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.settings.max_attempts => {
                    // Exponential backoff: 1s, 2s, 4s
                    let delay = backoff_delay(attempt);
                    warn!(
                        "LLM call attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() && attempt > 1 => {
                    return Err(LlmError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let response = self
            .client
            .post(&self.settings.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let llm_response: LlmResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// Bounded by the configured deadline. Dropping the future stops waiting for the
    /// upstream; the request may still complete on the provider's side.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let deadline = self.settings.deadline;
        let response = tokio::time::timeout(deadline, self.call(prompt))
            .await
            .map_err(|_| LlmError::Timeout(deadline))??;

        completion_text(&response)
    }
}

fn completion_text(response: &LlmResponse) -> Result<String, LlmError> {
    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::EmptyContent),
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS << (attempt - 1).min(6))
}


/// Canned generators for exercising the pipeline without network access.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    pub enum Reply {
        Text(String),
        ApiError(u16),
        Timeout,
    }

    /// Returns a fixed reply and records every prompt it receives.
    pub struct CannedGenerator {
        reply: Reply,
        pub prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        pub fn text(text: &str) -> Self {
            Self::new(Reply::Text(text.to_string()))
        }

        pub fn new(reply: Reply) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Reply::Text(text) => Ok(text.clone()),
                Reply::ApiError(status) => Err(LlmError::Api {
                    status: *status,
                    message: "upstream said no".to_string(),
                }),
                Reply::Timeout => Err(LlmError::Timeout(Duration::from_secs(1))),
            }
        }
    }
}
