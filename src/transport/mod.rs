//! Outbound transport for story generation.
//!
//! The form controller never talks to the network itself. It hands a
//! [`GenerationRequest`] to a [`StoryTransport`] and gets a
//! [`StoryResponse`] (or a transport error) back.
//!
//! ```text
//! ┌──────────────────┐   GenerationRequest   ┌─────────────────┐
//! │  ParameterForm   │ ────────────────────> │ StoryTransport  │
//! │  (validation)    │ <──────────────────── │ (HttpTransport) │
//! └──────────────────┘  Result<StoryResponse>└─────────────────┘
//!                                                     │
//!                               POST /story-playground/generate
//! ```

mod http;

pub use http::HttpTransport;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::story::{GenerationRequest, StoryResponse};

/// Boxed future returned by [`StoryTransport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<StoryResponse>> + Send + 'a>>;

/// Sends one generation request and returns the generated story.
///
/// Implementations perform exactly one attempt per call; there is no retry.
pub trait StoryTransport: Send + Sync {
    /// Send `request` to the generation endpoint.
    fn send<'a>(&'a self, request: &'a GenerationRequest) -> SendFuture<'a>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}
