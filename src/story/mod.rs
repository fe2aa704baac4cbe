//! Story requests, responses and prompts.
//!
//! - [`GenerationRequest`]: per-submission snapshot sent to the endpoint
//! - [`StoryResponse`]: `{title, story}` returned by the endpoint
//! - [`build_prompt`] / [`parse_story`]: the service side of the exchange

/// Path of the generation endpoint on the story service
pub const GENERATE_PATH: &str = "/story-playground/generate";

mod prompt;
mod request;

pub use prompt::{build_prompt, parse_story, GENRES, THEMES, UNTITLED};
pub use request::{ErrorDetail, GenerationRequest, StoryLength, StoryResponse, CHARACTER_RANGE};
