//! Model profile data structures.
//!
//! - `ParamRange`: inclusive `{min, max, default}` bounds for one parameter
//! - `ModelProfile`: model identity plus the bounds for temperature and
//!   maximum output tokens

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};

/// Inclusive bounds for a numeric generation parameter.
///
/// Invariant for a well-formed range: `min <= default <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange<T> {
    /// Lowest accepted value
    pub min: T,
    /// Highest accepted value
    pub max: T,
    /// Value used when nothing else is chosen
    pub default: T,
}

impl<T: PartialOrd + Copy> ParamRange<T> {
    /// Create a new range
    pub const fn new(min: T, max: T, default: T) -> Self {
        Self { min, max, default }
    }

    /// Check whether `value` lies inside the range (bounds included).
    ///
    /// Values that do not compare (NaN) are never contained.
    ///
    /// # Examples
    /// ```
    /// use playground::models::ParamRange;
    ///
    /// let range = ParamRange::new(0.0, 1.0, 0.5);
    /// assert!(range.contains(1.0));
    /// assert!(!range.contains(1.5));
    /// assert!(!range.contains(f64::NAN));
    /// ```
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check `min <= default <= max`
    pub fn is_well_formed(&self) -> bool {
        self.min <= self.max && self.contains(self.default)
    }
}

impl<T: PartialOrd + Copy + Display> ParamRange<T> {
    /// Validate `value`, naming the offending field in the error.
    pub fn check(&self, field: &'static str, value: T) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(PlaygroundError::OutOfRange {
                field,
                value: value.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            })
        }
    }
}

/// A selectable model configuration with its parameter bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    /// Human-readable label (e.g., "Claude 3.5 Sonnet")
    #[serde(alias = "model_name")]
    pub model_name: String,

    /// Stable identifier, unique within a registry
    #[serde(alias = "model_id")]
    pub model_id: String,

    /// Sampling temperature bounds
    #[serde(alias = "temperature_range")]
    pub temperature_range: ParamRange<f64>,

    /// Maximum output token bounds
    #[serde(alias = "max_token_range")]
    pub max_token_range: ParamRange<u32>,
}

impl ModelProfile {
    /// Create a profile with the common `[0, 1]` temperature and
    /// `[1, 4096]` token bounds
    pub fn new(model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_id: model_id.into(),
            temperature_range: ParamRange::new(0.0, 1.0, 0.5),
            max_token_range: ParamRange::new(1, 4096, 1000),
        }
    }

    /// Builder: set temperature bounds
    pub fn temperature(mut self, min: f64, max: f64, default: f64) -> Self {
        self.temperature_range = ParamRange::new(min, max, default);
        self
    }

    /// Builder: set max token bounds
    pub fn max_tokens(mut self, min: u32, max: u32, default: u32) -> Self {
        self.max_token_range = ParamRange::new(min, max, default);
        self
    }

    /// Validate the profile's invariants
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(PlaygroundError::Config(format!(
                "Profile '{}' has an empty model id",
                self.model_name
            )));
        }
        if !self.temperature_range.is_well_formed() {
            return Err(PlaygroundError::Config(format!(
                "Profile '{}': temperature range must satisfy min <= default <= max",
                self.model_id
            )));
        }
        if !self.max_token_range.is_well_formed() {
            return Err(PlaygroundError::Config(format!(
                "Profile '{}': max token range must satisfy min <= default <= max",
                self.model_id
            )));
        }
        Ok(())
    }
}
