//! Upstream text generators.
//!
//! The service turns a validated request into a prompt and hands it to a
//! [`StoryGenerator`]. [`MessagesGenerator`] speaks the Anthropic Messages
//! API; tests plug in their own implementations.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::{PlaygroundError, Result};

/// Boxed future returned by [`StoryGenerator::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anthropic API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Inputs for one generation call
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams<'a> {
    /// Full prompt text
    pub prompt: &'a str,
    /// Model name sent upstream
    pub model: &'a str,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum output tokens
    pub max_tokens: u32,
}

/// Produces raw story text from a prompt.
pub trait StoryGenerator: Send + Sync {
    /// Generate text for `params`.
    fn generate<'a>(&'a self, params: GenerationParams<'a>) -> GenerateFuture<'a>;

    /// Generator name for logging.
    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Generator for Messages-compatible upstreams (`POST {upstream}/v1/messages`).
#[derive(Debug, Clone)]
pub struct MessagesGenerator {
    client: Client,
    upstream_url: String,
    api_key: Option<String>,
}

impl MessagesGenerator {
    /// Create a generator from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlaygroundError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            upstream_url: config.upstream_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// URL messages are posted to
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.upstream_url)
    }

    async fn invoke(&self, params: GenerationParams<'_>) -> Result<String> {
        let body = MessagesRequest {
            model: params.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: [ChatMessage {
                role: "user",
                content: params.prompt,
            }],
        };

        tracing::debug!(
            model = params.model,
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "Invoking upstream generator"
        );

        let mut request = self
            .client
            .post(self.messages_url())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PlaygroundError::Upstream(format!("Failed to reach upstream: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    PlaygroundError::AccessDenied(format!("{status}: {detail}"))
                },
                _ => PlaygroundError::Upstream(format!("{status}: {detail}")),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PlaygroundError::Upstream(format!("Invalid upstream response: {e}")))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| PlaygroundError::Upstream("Upstream response had no text".to_string()))
    }
}

impl StoryGenerator for MessagesGenerator {
    fn generate<'a>(&'a self, params: GenerationParams<'a>) -> GenerateFuture<'a> {
        Box::pin(self.invoke(params))
    }

    fn name(&self) -> &'static str {
        "messages"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_url_trims_slash() {
        let config = ServerConfig {
            upstream_url: "http://localhost:4000/".to_string(),
            ..Default::default()
        };
        let generator = MessagesGenerator::new(&config).unwrap();
        assert_eq!(generator.messages_url(), "http://localhost:4000/v1/messages");
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude",
            max_tokens: 1000,
            temperature: 0.5,
            messages: [ChatMessage {
                role: "user",
                content: "Write a story",
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "claude",
                "max_tokens": 1000,
                "temperature": 0.5,
                "messages": [{"role": "user", "content": "Write a story"}]
            })
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [{"type": "text", "text": "Title: T\n\nBody"}],
            "stop_reason": "end_turn"
        }))
        .unwrap();
        assert_eq!(
            parsed.content.into_iter().find_map(|b| b.text).as_deref(),
            Some("Title: T\n\nBody")
        );
    }
}
