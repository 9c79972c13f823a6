//! Text-generation trait and implementations.
//!
//! The trait is deliberately narrow: a prompt and sampling options in, the
//! model's first continuation out.

mod api;
mod mock;

pub use api::{HfInferenceConfig, HfInferenceGenerator};
pub use mock::MockGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use snack_types::GenerationSettings;

/// Error type for generation operations.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Model returned no text")]
    EmptyOutput,
}

/// Sampling options passed with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sample instead of greedy decoding
    pub do_sample: bool,

    /// Nucleus sampling probability mass
    pub top_p: f32,

    /// Cap on newly generated tokens
    pub max_new_tokens: u32,

    /// Truncate over-long input instead of failing
    pub truncation: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            do_sample: true,
            top_p: 0.9,
            max_new_tokens: 30,
            truncation: true,
        }
    }
}

impl From<&GenerationSettings> for GenerationOptions {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            do_sample: settings.do_sample,
            top_p: settings.top_p,
            max_new_tokens: settings.max_new_tokens,
            truncation: settings.truncation,
        }
    }
}

/// Pluggable text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for diagnostics.
    fn model(&self) -> &str;

    /// Generate a continuation of `prompt`.
    ///
    /// Returns the model's first generated text as-is; it may or may not
    /// repeat the prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = GenerationOptions::default();
        assert!(options.do_sample);
        assert!((options.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(options.max_new_tokens, 30);
        assert!(options.truncation);
    }

    #[test]
    fn test_options_from_settings() {
        let settings = GenerationSettings {
            max_new_tokens: 12,
            do_sample: false,
            ..Default::default()
        };
        let options = GenerationOptions::from(&settings);
        assert_eq!(options.max_new_tokens, 12);
        assert!(!options.do_sample);
        assert!(options.truncation);
    }
}
