//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};
use crate::models::{ModelProfile, ModelRegistry};
use crate::story::GENERATE_PATH;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Generation endpoint the form submits to
    #[serde(default)]
    pub client: ClientConfig,

    /// Story service settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Model catalog settings
    #[serde(default)]
    pub models: ModelsConfig,
}

impl Config {
    /// Default config file location (`<config dir>/story-playground/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("story-playground").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| PlaygroundError::Config(format!("Failed to read config file: {e}")))?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Client settings
        if let Ok(host) = std::env::var("STORY_API_HOST") {
            config.client.api_host = host;
        }
        if let Ok(port) = std::env::var("STORY_API_PORT") {
            if let Ok(port) = port.parse() {
                config.client.api_port = port;
            }
        }

        // Server settings
        if let Ok(host) = std::env::var("STORY_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("STORY_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }
        if let Ok(upstream) = std::env::var("STORY_UPSTREAM_URL") {
            config.server.upstream_url = upstream;
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.server.api_key = Some(key);
        }

        // Model settings
        if let Ok(model) = std::env::var("STORY_DEFAULT_MODEL") {
            config.models.default_model = Some(model);
        }

        config
    }

    /// Load the default file if present, then layer environment on top
    pub fn load() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            },
            _ => Self::default(),
        };
        Ok(base.merge(Self::from_env()))
    }

    /// Merge with another config (other takes precedence where it differs from defaults)
    pub fn merge(self, other: Self) -> Self {
        let client_default = ClientConfig::default();
        let server_default = ServerConfig::default();

        Self {
            client: ClientConfig {
                api_host: pick(other.client.api_host, self.client.api_host, &client_default.api_host),
                api_port: pick(other.client.api_port, self.client.api_port, &client_default.api_port),
                timeout_secs: pick(
                    other.client.timeout_secs,
                    self.client.timeout_secs,
                    &client_default.timeout_secs,
                ),
            },
            server: ServerConfig {
                host: pick(other.server.host, self.server.host, &server_default.host),
                port: pick(other.server.port, self.server.port, &server_default.port),
                upstream_url: pick(
                    other.server.upstream_url,
                    self.server.upstream_url,
                    &server_default.upstream_url,
                ),
                api_key: other.server.api_key.or(self.server.api_key),
                upstream_model: other.server.upstream_model.or(self.server.upstream_model),
                timeout_secs: pick(
                    other.server.timeout_secs,
                    self.server.timeout_secs,
                    &server_default.timeout_secs,
                ),
                cors_enabled: pick(
                    other.server.cors_enabled,
                    self.server.cors_enabled,
                    &server_default.cors_enabled,
                ),
            },
            models: ModelsConfig {
                default_model: other.models.default_model.or(self.models.default_model),
                profiles: if other.models.profiles.is_empty() {
                    self.models.profiles
                } else {
                    other.models.profiles
                },
            },
        }
    }
}

fn pick<T: PartialEq>(preferred: T, fallback: T, default: &T) -> T {
    if preferred != *default {
        preferred
    } else {
        fallback
    }
}

/// Where the form sends generation requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host of the generation service (e.g., "http://localhost")
    pub api_host: String,

    /// Port of the generation service
    pub api_port: u16,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: "http://localhost".to_string(),
            api_port: 8000,
            timeout_secs: 120,
        }
    }
}

impl ClientConfig {
    /// Full URL of the generation endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}:{}{}",
            self.api_host.trim_end_matches('/'),
            self.api_port,
            GENERATE_PATH
        )
    }
}

/// Story service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Messages-compatible upstream base URL (e.g., https://api.anthropic.com)
    pub upstream_url: String,

    /// API key for the upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name sent upstream instead of the profile id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_model: Option<String>,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,

    /// Allow cross-origin requests
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            upstream_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            upstream_model: None,
            timeout_secs: 120,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Get the full listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model catalog configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Profile to make the default (moved to the front of the catalog)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Custom catalog; replaces the embedded one when non-empty
    pub profiles: Vec<ModelProfile>,
}

impl ModelsConfig {
    /// Build the registry described by this section
    pub fn build_registry(&self) -> Result<ModelRegistry> {
        let registry = if self.profiles.is_empty() {
            ModelRegistry::new()
        } else {
            ModelRegistry::from_profiles(self.profiles.clone())?
        };

        match &self.default_model {
            Some(id) => registry.with_default(id),
            None => Ok(registry),
        }
    }
}
