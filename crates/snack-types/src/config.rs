//! Configuration loading for the snack tools.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/nepali-snacks/config.toml`.

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SnackError;

/// Environment variable consulted when no generation token is configured.
pub const HUGGINGFACE_TOKEN_ENV: &str = "HUGGINGFACE_TOKEN";

/// Text-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Model identifier (e.g., "distilgpt2")
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Inference API base URL; the model id is appended as a path segment
    #[serde(default = "default_generation_api_base_url")]
    pub api_base_url: String,

    /// API token (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on newly generated tokens
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Nucleus sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_true")]
    pub do_sample: bool,

    /// Truncate the prompt to fit the model context
    #[serde(default = "default_true")]
    pub truncation: bool,

    /// Model context length in tokens
    #[serde(default = "default_context_window")]
    pub context_window: u32,
}

fn default_generation_model() -> String {
    "distilgpt2".to_string()
}

fn default_generation_api_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_max_new_tokens() -> u32 {
    30
}

fn default_top_p() -> f32 {
    0.9
}

fn default_true() -> bool {
    true
}

fn default_context_window() -> u32 {
    1024
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            api_base_url: default_generation_api_base_url(),
            api_token: None,
            timeout_secs: default_generation_timeout_secs(),
            max_new_tokens: default_max_new_tokens(),
            top_p: default_top_p(),
            do_sample: true,
            truncation: true,
            context_window: default_context_window(),
        }
    }
}

impl GenerationSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("generation.model cannot be empty".to_string());
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(format!("generation.top_p must be in (0, 1], got {}", self.top_p));
        }
        if self.max_new_tokens == 0 {
            return Err("generation.max_new_tokens must be > 0".to_string());
        }
        if self.context_window <= self.max_new_tokens {
            return Err(format!(
                "generation.context_window ({}) must exceed max_new_tokens ({})",
                self.context_window, self.max_new_tokens
            ));
        }
        if self.timeout_secs == 0 {
            return Err("generation.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Sentence-embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// HuggingFace model repository
    #[serde(default = "default_embedding_model_repo")]
    pub model_repo: String,

    /// Model cache directory (platform cache dir when unset)
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_embedding_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_repo: default_embedding_model_repo(),
            cache_dir: None,
        }
    }
}

/// Similarity recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Minimum boosted score to keep a recommendation (0.0-1.0)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Added to the score when categories match
    #[serde(default = "default_category_boost")]
    pub category_boost: f32,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_similarity_threshold() -> f32 {
    0.6
}

fn default_category_boost() -> f32 {
    0.1
}

fn default_max_results() -> usize {
    5
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            category_boost: default_category_boost(),
            max_results: default_max_results(),
        }
    }
}

impl RecommendationSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(format!(
                "recommendation.similarity_threshold must be 0.0-1.0, got {}",
                self.similarity_threshold
            ));
        }
        if self.category_boost < 0.0 {
            return Err("recommendation.category_boost must be >= 0".to_string());
        }
        if self.max_results == 0 {
            return Err("recommendation.max_results must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where the batch tool writes the embeddings document
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// JSON catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub recommendation: RecommendationSettings,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_output_path() -> String {
    "snack_embeddings.json".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_path: default_output_path(),
            catalog_path: None,
            generation: GenerationSettings::default(),
            embedding: EmbeddingSettings::default(),
            recommendation: RecommendationSettings::default(),
        }
    }
}

fn config_err(e: ConfigError) -> SnackError {
    SnackError::Config(e.to_string())
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/nepali-snacks/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (SNACK_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, SnackError> {
        let config_dir = ProjectDirs::from("", "", "nepali-snacks")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(config_err)?
            .set_default("output_path", default_output_path())
            .map_err(config_err)?
            .set_default("generation.model", default_generation_model())
            .map_err(config_err)?
            .set_default("embedding.model_repo", default_embedding_model_repo())
            .map_err(config_err)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: SNACK_LOG_LEVEL, SNACK_GENERATION__MODEL, SNACK_EMBEDDING__CACHE_DIR
        builder = builder.add_source(
            Environment::with_prefix("SNACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Settings = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        if settings.generation.api_token.is_none() {
            settings.generation.api_token = std::env::var(HUGGINGFACE_TOKEN_ENV)
                .ok()
                .filter(|token| !token.trim().is_empty());
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), SnackError> {
        self.generation.validate().map_err(SnackError::Config)?;
        self.recommendation.validate().map_err(SnackError::Config)?;
        if self.output_path.trim().is_empty() {
            return Err(SnackError::Config("output_path cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_path)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.as_ref().map(PathBuf::from)
    }
}
