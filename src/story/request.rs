//! Request and response records exchanged with the generation endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ModelProfile, ParamRange};

/// Accepted main-character counts (profile independent)
pub const CHARACTER_RANGE: ParamRange<u8> = ParamRange::new(1, 10, 1);

/// Story length selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    /// About 500 words
    Short,
    /// About 1000 words
    #[default]
    Medium,
    /// About 2000 words
    Long,
}

impl StoryLength {
    /// All lengths in display order
    pub const ALL: [StoryLength; 3] = [StoryLength::Short, StoryLength::Medium, StoryLength::Long];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryLength::Short => "short",
            StoryLength::Medium => "medium",
            StoryLength::Long => "long",
        }
    }

    /// Approximate word count the prompt asks for
    pub fn target_words(&self) -> u32 {
        match self {
            StoryLength::Short => 500,
            StoryLength::Medium => 1000,
            StoryLength::Long => 2000,
        }
    }
}

impl fmt::Display for StoryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryLength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "s" => Ok(StoryLength::Short),
            "medium" | "m" => Ok(StoryLength::Medium),
            "long" | "l" => Ok(StoryLength::Long),
            _ => Err(format!("Unknown story length: {s}. Use: short, medium, long")),
        }
    }
}

/// Snapshot of the form handed to the transport.
///
/// Serialized as `{theme, genre, characters, length, temperature, maxTokens}`,
/// plus `modelId` when the values were chosen under a non-default profile.
/// The service validates against that profile, or its own default when the
/// field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Story theme; the service picks one at random when absent
    #[serde(default)]
    pub theme: Option<String>,

    /// Story genre; the service picks one at random when absent
    #[serde(default)]
    pub genre: Option<String>,

    /// Number of main characters
    #[serde(default = "default_characters")]
    pub characters: u8,

    /// Target length
    #[serde(default)]
    pub length: StoryLength,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Profile the values were chosen under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

fn default_characters() -> u8 {
    CHARACTER_RANGE.default
}

impl GenerationRequest {
    /// Create a request using a profile's defaults
    pub fn for_profile(profile: &ModelProfile) -> Self {
        Self {
            theme: None,
            genre: None,
            characters: CHARACTER_RANGE.default,
            length: StoryLength::default(),
            temperature: profile.temperature_range.default,
            max_tokens: profile.max_token_range.default,
            model_id: None,
        }
    }

    /// Check every bounded field against `profile`
    pub fn validate(&self, profile: &ModelProfile) -> Result<()> {
        CHARACTER_RANGE.check("characters", self.characters)?;
        profile
            .temperature_range
            .check("temperature", self.temperature)?;
        profile.max_token_range.check("maxTokens", self.max_tokens)?;
        Ok(())
    }
}

/// Generated story as returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryResponse {
    /// Story title
    pub title: String,
    /// Story body
    pub story: String,
}

impl StoryResponse {
    /// Create a new response
    pub fn new(title: impl Into<String>, story: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            story: story.into(),
        }
    }
}

/// Error body returned by the service (`{"detail": "..."}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable description
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaygroundError;
    use crate::models::ModelRegistry;
    use serde_json::json;

    #[test]
    fn test_length_parse() {
        assert_eq!("short".parse::<StoryLength>().unwrap(), StoryLength::Short);
        assert_eq!("LONG".parse::<StoryLength>().unwrap(), StoryLength::Long);
        assert!("epic".parse::<StoryLength>().is_err());
        assert_eq!(StoryLength::default(), StoryLength::Medium);
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerationRequest {
            theme: Some("mystery".into()),
            genre: Some("thriller".into()),
            characters: 3,
            length: StoryLength::Short,
            temperature: 0.8,
            max_tokens: 200,
            model_id: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "theme": "mystery",
                "genre": "thriller",
                "characters": 3,
                "length": "short",
                "temperature": 0.8,
                "maxTokens": 200
            })
        );
    }

    #[test]
    fn test_request_defaults_on_deserialize() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"temperature": 0.7, "maxTokens": 1000}"#).unwrap();
        assert_eq!(request.characters, 1);
        assert_eq!(request.length, StoryLength::Medium);
        assert!(request.theme.is_none());
        assert!(request.model_id.is_none());
    }

    #[test]
    fn test_request_model_id_on_wire() {
        let mut request = GenerationRequest::for_profile(ModelRegistry::new().default_profile());
        request.model_id = Some("ai21.j2-mid-v1".into());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["modelId"], "ai21.j2-mid-v1");

        let parsed: GenerationRequest = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.model_id.as_deref(), Some("ai21.j2-mid-v1"));
    }

    #[test]
    fn test_validate_against_profile() {
        let registry = ModelRegistry::new();
        let profile = registry.default_profile();

        let mut request = GenerationRequest::for_profile(profile);
        assert!(request.validate(profile).is_ok());

        request.temperature = 1.5;
        assert!(matches!(
            request.validate(profile),
            Err(PlaygroundError::OutOfRange {
                field: "temperature",
                ..
            })
        ));

        request.temperature = 0.5;
        request.characters = 11;
        assert!(matches!(
            request.validate(profile),
            Err(PlaygroundError::OutOfRange {
                field: "characters",
                ..
            })
        ));

        request.characters = 2;
        request.max_tokens = 8191;
        assert!(request.validate(profile).is_err());
        let jurassic = registry.lookup("ai21.j2-mid-v1").unwrap();
        assert!(request.validate(jurassic).is_ok());
    }
}
