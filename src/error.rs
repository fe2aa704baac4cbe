//! Story playground error types.
//!
//! Errors fall into two groups:
//!
//! - **Surfaced**: unknown model ids, transport failures, inconsistent
//!   submissions, bad configuration. These propagate as `Result`.
//! - **Absorbed**: out-of-range input handed to a form setter. The setter
//!   returns `false` and keeps the previous value; [`PlaygroundError::OutOfRange`]
//!   only appears where a whole request is validated at once (the service
//!   boundary).
//!
//! Transport failures keep their cause for logging. What the user sees is
//! [`USER_FACING_ERROR`], never the cause itself.

use thiserror::Error;

/// Message shown to the user when a submission fails for any transport reason.
pub const USER_FACING_ERROR: &str = "Failed to generate story. Please try again.";

/// Story playground errors.
#[derive(Error, Debug)]
pub enum PlaygroundError {
    /// Model id is not in the registry.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A parameter lies outside the active profile's bounds.
    #[error("{field} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// Parameter name as it appears on the wire.
        field: &'static str,
        /// Rejected value.
        value: String,
        /// Lower bound (inclusive).
        min: String,
        /// Upper bound (inclusive).
        max: String,
    },

    /// Submission attempted with an internally inconsistent snapshot.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Network failure, non-2xx status, or undecodable response.
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status, when the failure came from a response.
        status: Option<u16>,
        /// Underlying cause (logged, never displayed).
        message: String,
    },

    /// Upstream generator refused the credentials.
    #[error("Access denied by upstream: {0}")]
    AccessDenied(String),

    /// Upstream generator failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for playground operations
pub type Result<T> = std::result::Result<T, PlaygroundError>;

impl PlaygroundError {
    /// Build a transport error from a failed HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        PlaygroundError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether this error came from the outbound call.
    pub fn is_transport(&self) -> bool {
        matches!(self, PlaygroundError::Transport { .. })
    }
}

impl From<reqwest::Error> for PlaygroundError {
    fn from(err: reqwest::Error) -> Self {
        PlaygroundError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PlaygroundError {
    fn from(err: toml::de::Error) -> Self {
        PlaygroundError::Config(format!("Failed to parse config: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = PlaygroundError::OutOfRange {
            field: "temperature",
            value: "1.5".to_string(),
            min: "0".to_string(),
            max: "1".to_string(),
        };
        assert_eq!(err.to_string(), "temperature out of range: 1.5 not in [0, 1]");
    }

    #[test]
    fn test_transport_status() {
        let err = PlaygroundError::status(500, "Internal Server Error");
        assert!(err.is_transport());
        assert!(matches!(
            err,
            PlaygroundError::Transport {
                status: Some(500),
                ..
            }
        ));
        assert!(!PlaygroundError::ModelNotFound("x".into()).is_transport());
    }
}
