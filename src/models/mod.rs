//! Model registry and parameter bounds.
//!
//! This module provides the catalog of selectable model profiles:
//! - Identity (label and stable id)
//! - Temperature bounds
//! - Maximum output token bounds
//! - A designated default profile
//!
//! # Example
//!
//! ```
//! use playground::models::ModelRegistry;
//!
//! let registry = ModelRegistry::new();
//!
//! let default = registry.default_profile();
//! assert_eq!(default.model_name, "Claude 3.5 Sonnet");
//! assert!(default.temperature_range.contains(0.8));
//!
//! let jurassic = registry.lookup("ai21.j2-mid-v1").unwrap();
//! assert_eq!(jurassic.max_token_range.max, 8191);
//!
//! assert!(registry.lookup("unknown-model").is_err());
//! ```

mod card;
mod embedded;
mod registry;

pub use card::{ModelProfile, ParamRange};
pub use embedded::{default_embedded_id, get_embedded_profiles, EMBEDDED_PROFILES};
pub use registry::ModelRegistry;
