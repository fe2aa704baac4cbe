//! Embedded model profiles.
//!
//! The built-in catalog compiled into the binary. The first entry is the
//! default profile.

use crate::models::{ModelProfile, ParamRange};

/// Embedded profile tuple: (id, name, temperature bounds, max token bounds)
pub type EmbeddedProfile = (
    &'static str,
    &'static str,
    ParamRange<f64>,
    ParamRange<u32>,
);

/// All embedded profile definitions, default first
pub static EMBEDDED_PROFILES: &[EmbeddedProfile] = &[
    // Anthropic Claude (Messages API)
    (
        "anthropic.claude-3-5-sonnet-20240620-v1:0",
        "Claude 3.5 Sonnet",
        ParamRange::new(0.0, 1.0, 0.5),
        ParamRange::new(1, 4096, 1000),
    ),
    (
        "us.anthropic.claude-3-5-sonnet-20241022-v2:0",
        "Claude 3.5 Sonnet v2",
        ParamRange::new(0.0, 1.0, 0.5),
        ParamRange::new(1, 8192, 1000),
    ),
    (
        "anthropic.claude-3-haiku-20240307-v1:0",
        "Claude 3 Haiku",
        ParamRange::new(0.0, 1.0, 0.5),
        ParamRange::new(1, 4096, 1000),
    ),
    // AI21 Jurassic-2
    (
        "ai21.j2-mid-v1",
        "Jurassic-2 Mid",
        ParamRange::new(0.0, 1.0, 0.7),
        ParamRange::new(0, 8191, 200),
    ),
    (
        "ai21.j2-ultra-v1",
        "Jurassic-2 Ultra",
        ParamRange::new(0.0, 1.0, 0.7),
        ParamRange::new(0, 8191, 200),
    ),
];

/// Build profiles from the embedded definitions
pub fn get_embedded_profiles() -> Vec<ModelProfile> {
    EMBEDDED_PROFILES
        .iter()
        .map(|&(id, name, temperature_range, max_token_range)| ModelProfile {
            model_name: name.to_string(),
            model_id: id.to_string(),
            temperature_range,
            max_token_range,
        })
        .collect()
}

/// Id of the default embedded profile
pub fn default_embedded_id() -> &'static str {
    EMBEDDED_PROFILES[0].0
}
