//! # Story Playground
//!
//! Model-profile registry, validated story-generation parameters, and the
//! client/service pair that turns them into a story.
//!
//! ## Overview
//!
//! ```text
//!   user edits ──> ParameterForm ──validate──> ModelProfile bounds
//!                       │                        (ModelRegistry)
//!                submit │ GenerationRequest
//!                       v
//!                StoryTransport ── POST /story-playground/generate ──> story service
//!                       │                                                 │
//!                       │ <──────────── {title, story} ────────────────────┘
//!                       v
//!               last_story / last_error
//! ```
//!
//! ### Validation policy
//!
//! Temperature and max tokens are bounded by the active profile, character
//! count by `[1, 10]`. Setters discard out-of-range input and keep the
//! previous value (clamp-reject); they report whether the value was applied
//! and never fail. Switching profiles resets only the values that no longer
//! fit.
//!
//! ### Submission
//!
//! At most one submission is in flight per form. A second `submit()` is a
//! no-op. Responses that arrive after the form is disposed are dropped. A
//! failed call leaves every field untouched and sets one user-facing message;
//! the cause goes to the log.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use playground::{Config, HttpTransport, ModelRegistry, ParameterForm, StoryLength};
//!
//! let config = Config::load()?;
//! let registry = Arc::new(config.models.build_registry()?);
//! let transport = HttpTransport::new(&config.client)?;
//!
//! let mut form = ParameterForm::new(registry);
//! form.set_theme("mystery");
//! form.set_length(StoryLength::Short);
//! form.set_temperature(0.8);
//!
//! form.submit_with(&transport).await?;
//! if let Some(story) = form.last_story() {
//!     println!("{}\n\n{}", story.title, story.story);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`models`]: Model profiles and the registry
//! - [`form`]: Parameter form controller
//! - [`story`]: Request/response records, prompt building
//! - [`transport`]: Outbound HTTP transport
//! - [`server`]: Story generation service (Axum-based)
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod server;
pub mod story;
pub mod transport;

// Re-exports for convenience
pub use config::Config;
pub use error::{PlaygroundError, Result, USER_FACING_ERROR};
pub use form::{run_submission, FormState, ParameterForm, SubmitTicket};
pub use models::{ModelProfile, ModelRegistry, ParamRange};
pub use server::StoryServer;
pub use story::{GenerationRequest, StoryLength, StoryResponse};
pub use transport::{HttpTransport, StoryTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
