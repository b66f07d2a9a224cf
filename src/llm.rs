//! Text-generation providers.
//!
//! [`LlmClient`] implements [`TextGenerator`] for several providers. The
//! policy prompt always travels on the provider's system channel and the
//! user text on the user channel.
//!
//! # Supported Providers
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | OpenAI | `{base_url}/chat/completions` | Bearer token |
//! | Anthropic | `{base_url}/v1/messages` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//!
//! Any OpenAI-compatible server can be used by overriding the base URL.
//!
//! # Failure mapping
//!
//! - HTTP 429 maps to [`TranslationFailure::RateLimited`]
//! - any other non-success status, and transport errors, map to
//!   [`TranslationFailure::ServiceRejected`]
//!
//! Requests are not retried.
//!
//! # Example
//!
//! ```
//! use nl_sql_gateway::llm::{LlmClient, LlmProvider};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//!
//! let client = LlmClient::new(provider);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::{TranslationFailure, describe_http_error},
    translate::TextGenerator
};

/// Default OpenAI API root
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI or any OpenAI-compatible chat completions API
    OpenAI {
        /// API key (sk-...)
        api_key:  String,
        /// Model identifier (e.g., "gpt-4.1")
        model:    String,
        /// API root (e.g., "https://api.openai.com/v1")
        base_url: String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key:  String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:    String,
        /// API root (e.g., "https://api.anthropic.com")
        base_url: String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2", "codellama")
        model:    String
    }
}

impl LlmProvider {
    fn label(&self) -> &'static str {
        match self {
            Self::OpenAI {
                ..
            } => "OpenAI",
            Self::Anthropic {
                ..
            } => "Anthropic",
            Self::Ollama {
                ..
            } => "Ollama"
        }
    }
}

/// HTTP client for text-generation APIs.
pub struct LlmClient {
    provider: LlmProvider,
    client:   reqwest::Client
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model:       &'a str,
    messages:    [ChatMessage<'a>; 2],
    temperature: f32
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role:    &'static str,
    content: &'a str
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model:      &'a str,
    max_tokens: u32,
    system:     &'a str,
    messages:   [ChatMessage<'a>; 1]
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model:  &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String
}

impl LlmClient {
    /// Create new LLM client with the default request timeout
    pub fn new(provider: LlmProvider) -> Self {
        Self::with_timeout(provider, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create new LLM client with a custom request timeout
    pub fn with_timeout(provider: LlmProvider, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            provider,
            client
        }
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        instructions: &str,
        input: &str
    ) -> Result<String, TranslationFailure> {
        let request = OpenAIRequest {
            model,
            messages: [
                ChatMessage {
                    role:    "system",
                    content: instructions
                },
                ChatMessage {
                    role:    "user",
                    content: input
                }
            ],
            temperature: 0.0
        };
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request);
        let result: OpenAIResponse = self.send(builder).await?;
        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        instructions: &str,
        input: &str
    ) -> Result<String, TranslationFailure> {
        let request = AnthropicRequest {
            model,
            max_tokens: 1024,
            system: instructions,
            messages: [ChatMessage {
                role:    "user",
                content: input
            }]
        };
        let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));
        let builder = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request);
        let result: AnthropicResponse = self.send(builder).await?;
        Ok(result
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .concat())
    }

    async fn call_ollama(
        &self,
        base_url: &str,
        model: &str,
        instructions: &str,
        input: &str
    ) -> Result<String, TranslationFailure> {
        let request = OllamaRequest {
            model,
            system: instructions,
            prompt: input,
            stream: false
        };
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let builder = self.client.post(&url).json(&request);
        let result: OllamaResponse = self.send(builder).await?;
        Ok(result.response)
    }

    async fn send<R: DeserializeOwned>(
        &self,
        builder: RequestBuilder
    ) -> Result<R, TranslationFailure> {
        let label = self.provider.label();
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(provider = label, error = %e, "text-generation request failed");
            TranslationFailure::ServiceRejected(describe_http_error(&e))
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = label, %status, body = %body, "text-generation service returned an error");
            return Err(status_failure(label, status));
        }
        response.json().await.map_err(|e| {
            TranslationFailure::ServiceRejected(format!(
                "{} API response unreadable: {}",
                label,
                describe_http_error(&e)
            ))
        })
    }
}

fn status_failure(label: &str, status: StatusCode) -> TranslationFailure {
    if status == StatusCode::TOO_MANY_REQUESTS {
        TranslationFailure::RateLimited
    } else {
        TranslationFailure::ServiceRejected(format!("{} API error {}", label, status))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, instructions: &str, input: &str) -> Result<String, TranslationFailure> {
        match &self.provider {
            LlmProvider::OpenAI {
                api_key,
                model,
                base_url
            } => {
                self.call_openai(api_key, model, base_url, instructions, input)
                    .await
            }
            LlmProvider::Anthropic {
                api_key,
                model,
                base_url
            } => {
                self.call_anthropic(api_key, model, base_url, instructions, input)
                    .await
            }
            LlmProvider::Ollama {
                base_url,
                model
            } => self.call_ollama(base_url, model, instructions, input).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        assert_eq!(
            status_failure("OpenAI", StatusCode::TOO_MANY_REQUESTS),
            TranslationFailure::RateLimited
        );
    }

    #[test]
    fn other_statuses_are_rejections() {
        assert!(matches!(
            status_failure("OpenAI", StatusCode::BAD_REQUEST),
            TranslationFailure::ServiceRejected(msg) if msg.contains("400")
        ));
        assert!(matches!(
            status_failure("Ollama", StatusCode::BAD_GATEWAY),
            TranslationFailure::ServiceRejected(_)
        ));
    }
}
