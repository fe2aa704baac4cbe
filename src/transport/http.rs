//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use reqwest::Client;

use super::{SendFuture, StoryTransport};
use crate::config::ClientConfig;
use crate::error::{PlaygroundError, Result};
use crate::story::{GenerationRequest, StoryResponse};

/// Posts requests as JSON to `{api_host}:{api_port}/story-playground/generate`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlaygroundError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &GenerationRequest) -> Result<StoryResponse> {
        tracing::debug!(endpoint = %self.endpoint, ?request, "Sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlaygroundError::status(
                status.as_u16(),
                format!("Generation endpoint returned {status}: {body}"),
            ));
        }

        let story: StoryResponse = response.json().await?;
        tracing::debug!(title = %story.title, chars = story.story.len(), "Received story");
        Ok(story)
    }
}

impl StoryTransport for HttpTransport {
    fn send<'a>(&'a self, request: &'a GenerationRequest) -> SendFuture<'a> {
        Box::pin(self.post(request))
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}
