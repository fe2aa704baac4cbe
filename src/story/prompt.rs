//! Prompt construction and title extraction.
//!
//! The generator is asked to open its answer with a `Title: ...` line;
//! [`parse_story`] splits that line back out.

use rand::seq::SliceRandom;
use rand::Rng;

use super::request::{GenerationRequest, StoryLength, StoryResponse};

/// Themes drawn from when a request leaves the theme unset
pub const THEMES: &[&str] = &[
    "adventure",
    "mystery",
    "fantasy",
    "science fiction",
    "romance",
    "horror",
    "historical",
    "comedy",
    "drama",
    "fairy tale",
];

/// Genres drawn from when a request leaves the genre unset
pub const GENRES: &[&str] = &[
    "action",
    "thriller",
    "dystopian",
    "utopian",
    "western",
    "cyberpunk",
    "steampunk",
    "magical realism",
    "urban fantasy",
    "space opera",
];

/// Title used when the generated text has no `Title:` line
pub const UNTITLED: &str = "Untitled Story";

const TITLE_PREFIX: &str = "Title:";

fn length_description(length: StoryLength) -> String {
    let words = length.target_words();
    match length {
        StoryLength::Short => format!("a short story (about {words} words)"),
        StoryLength::Medium => format!("a medium-length story (about {words} words)"),
        StoryLength::Long => format!("a longer story (about {words} words)"),
    }
}

fn pick<'a, R: Rng + ?Sized>(chosen: Option<&'a str>, pool: &[&'a str], rng: &mut R) -> &'a str {
    match chosen.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value,
        None => pool.choose(rng).copied().unwrap_or(pool[0]),
    }
}

/// Build the generation prompt for `request`.
///
/// # Examples
/// ```
/// use playground::story::{build_prompt, GenerationRequest, StoryLength};
///
/// let request = GenerationRequest {
///     theme: Some("mystery".into()),
///     genre: Some("thriller".into()),
///     characters: 3,
///     length: StoryLength::Short,
///     temperature: 0.7,
///     max_tokens: 1000,
///     model_id: None,
/// };
/// let prompt = build_prompt(&request, &mut rand::thread_rng());
/// assert!(prompt.contains("3 main characters"));
/// assert!(prompt.contains("short story"));
/// ```
pub fn build_prompt<R: Rng + ?Sized>(request: &GenerationRequest, rng: &mut R) -> String {
    let theme = pick(request.theme.as_deref(), THEMES, rng);
    let genre = pick(request.genre.as_deref(), GENRES, rng);
    let plural = if request.characters > 1 { "s" } else { "" };

    format!(
        "Write {} in the {genre} genre with a {theme} theme, featuring {} main character{plural}. \
         Include a creative title at the beginning of your response in the format '{TITLE_PREFIX} [Your Title]'.",
        length_description(request.length),
        request.characters,
    )
}

/// Split generated text into title and body.
pub fn parse_story(text: &str) -> StoryResponse {
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));

    match first.strip_prefix(TITLE_PREFIX) {
        Some(title) => StoryResponse::new(title.trim(), rest.trim()),
        None => StoryResponse::new(UNTITLED, text),
    }
}
