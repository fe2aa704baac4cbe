//! Story generation service.
//!
//! Serves the endpoint the form submits to, plus catalog and health routes:
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/health` | GET | Health check |
//! | `/foundation-models` | GET | Profile catalog |
//! | `/foundation-models/model/:model_id` | GET | One profile |
//! | `/story-playground/generate` | POST | Generate a story |
//!
//! # Example
//!
//! ```rust,ignore
//! use playground::config::ServerConfig;
//! use playground::server::StoryServer;
//!
//! let server = StoryServer::from_config(ServerConfig::default(), registry)?;
//! server.run().await?;
//! ```

mod generator;
mod handlers;
mod state;

pub use generator::{
    GenerateFuture, GenerationParams, MessagesGenerator, StoryGenerator, ANTHROPIC_VERSION,
};
pub use handlers::{create_router, HealthResponse};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{PlaygroundError, Result};
use crate::models::ModelRegistry;

/// Story service
pub struct StoryServer {
    state: Arc<AppState>,
}

impl StoryServer {
    /// Create a server with an explicit generator
    pub fn new(
        config: ServerConfig,
        registry: Arc<ModelRegistry>,
        generator: Arc<dyn StoryGenerator>,
    ) -> Self {
        Self {
            state: Arc::new(AppState::new(config, registry, generator)),
        }
    }

    /// Create a server backed by a [`MessagesGenerator`]
    pub fn from_config(config: ServerConfig, registry: Arc<ModelRegistry>) -> Result<Self> {
        let generator = Arc::new(MessagesGenerator::new(&config)?);
        Ok(Self::new(config, registry, generator))
    }

    /// Get the router for the service
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind and serve until the listener fails.
    pub async fn run(&self) -> Result<()> {
        let addr = self.state.config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| PlaygroundError::Config(format!("Failed to bind {addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        tracing::info!("Story service listening on {}", listener.local_addr()?);
        tracing::info!("Upstream: {}", self.state.config.upstream_url);
        tracing::info!("Active profile: {}", self.state.active_profile().model_id);
        if self.state.config.api_key.is_none() {
            tracing::warn!("No upstream API key configured");
        }

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
