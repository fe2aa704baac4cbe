//! Shared service state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::generator::StoryGenerator;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::models::{ModelProfile, ModelRegistry};

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Model catalog; the default profile bounds incoming requests
    pub registry: Arc<ModelRegistry>,
    /// Upstream text generator
    pub generator: Arc<dyn StoryGenerator>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServerConfig,
        registry: Arc<ModelRegistry>,
        generator: Arc<dyn StoryGenerator>,
    ) -> Self {
        Self {
            config,
            registry,
            generator,
            start_time: Instant::now(),
        }
    }

    /// Profile used for requests that do not name one
    pub fn active_profile(&self) -> &ModelProfile {
        self.registry.default_profile()
    }

    /// Profile a request is validated against
    pub fn resolve_profile(&self, model_id: Option<&str>) -> Result<&ModelProfile> {
        match model_id {
            Some(id) => self.registry.lookup(id),
            None => Ok(self.active_profile()),
        }
    }

    /// Model name sent upstream.
    ///
    /// A requested profile id goes through as is; otherwise the configured
    /// override, then the default profile id.
    pub fn upstream_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(id) => id,
            None => self
                .config
                .upstream_model
                .as_deref()
                .unwrap_or(&self.active_profile().model_id),
        }
    }

    /// Get server uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
