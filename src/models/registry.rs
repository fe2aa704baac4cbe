//! Model registry for profile lookups.
//!
//! The registry provides:
//! - The ordered catalog for display
//! - The designated default profile
//! - Lookup by model id

use std::collections::HashMap;

use crate::error::{PlaygroundError, Result};
use crate::models::card::ModelProfile;
use crate::models::embedded::get_embedded_profiles;

/// Immutable catalog of model profiles.
///
/// Profiles keep their insertion order; the first one is the default.
/// A registry is never empty and never holds two profiles with the same id.
///
/// # Example
/// ```
/// use playground::models::{ModelProfile, ModelRegistry};
///
/// let registry = ModelRegistry::from_profiles(vec![
///     ModelProfile::new("small", "Small").max_tokens(1, 1024, 256),
///     ModelProfile::new("large", "Large").max_tokens(1, 8192, 1024),
/// ])
/// .unwrap();
///
/// assert_eq!(registry.default_profile().model_id, "small");
/// assert_eq!(registry.lookup("large").unwrap().max_token_range.max, 8192);
/// ```
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Profiles in display order
    profiles: Vec<ModelProfile>,

    /// model_id -> position in `profiles`
    by_id: HashMap<String, usize>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Create a registry holding the embedded catalog
    pub fn new() -> Self {
        let profiles = get_embedded_profiles();
        let by_id = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.model_id.clone(), i))
            .collect();
        Self { profiles, by_id }
    }

    /// Create a registry from explicit profiles.
    ///
    /// Fails when `profiles` is empty, when two profiles share an id, or when
    /// a profile's ranges are not well formed.
    pub fn from_profiles(profiles: Vec<ModelProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(PlaygroundError::Config(
                "Model registry requires at least one profile".to_string(),
            ));
        }

        let mut by_id = HashMap::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if by_id.insert(profile.model_id.clone(), i).is_some() {
                return Err(PlaygroundError::Config(format!(
                    "Duplicate model id in registry: {}",
                    profile.model_id
                )));
            }
        }

        Ok(Self { profiles, by_id })
    }

    /// Return a copy whose default is `model_id`.
    ///
    /// The chosen profile moves to the front; the others keep their order.
    pub fn with_default(mut self, model_id: &str) -> Result<Self> {
        let index = *self
            .by_id
            .get(model_id)
            .ok_or_else(|| PlaygroundError::ModelNotFound(model_id.to_string()))?;

        let profile = self.profiles.remove(index);
        self.profiles.insert(0, profile);
        self.by_id = self
            .profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.model_id.clone(), i))
            .collect();
        Ok(self)
    }

    /// All profiles in display order
    pub fn list_profiles(&self) -> &[ModelProfile] {
        &self.profiles
    }

    /// The designated default profile
    pub fn default_profile(&self) -> &ModelProfile {
        // Construction guarantees at least one profile
        &self.profiles[0]
    }

    /// Look up a profile by id
    pub fn lookup(&self, model_id: &str) -> Result<&ModelProfile> {
        self.by_id
            .get(model_id)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| PlaygroundError::ModelNotFound(model_id.to_string()))
    }

    /// Check if a profile exists
    pub fn contains(&self, model_id: &str) -> bool {
        self.by_id.contains_key(model_id)
    }

    /// Search profiles by id or name (case-insensitive substring)
    pub fn search(&self, query: &str) -> Vec<&ModelProfile> {
        let query = query.to_lowercase();
        self.profiles
            .iter()
            .filter(|p| {
                p.model_id.to_lowercase().contains(&query)
                    || p.model_name.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate profiles in display order
    pub fn iter(&self) -> impl Iterator<Item = &ModelProfile> {
        self.profiles.iter()
    }
}
