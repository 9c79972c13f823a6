//! Text generation through the Hugging Face inference API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use snack_types::GenerationSettings;

use super::{GenerationError, GenerationOptions, TextGenerator};

/// Configuration for the inference API generator.
#[derive(Debug, Clone)]
pub struct HfInferenceConfig {
    /// API base URL (e.g., "https://api-inference.huggingface.co/models")
    pub base_url: String,

    /// Model to use (e.g., "distilgpt2")
    pub model: String,

    /// Optional API token
    pub api_token: Option<SecretString>,

    /// Request timeout
    pub timeout: Duration,

    /// Model context length; input is truncated to leave room for new tokens
    pub context_window: u32,
}

impl HfInferenceConfig {
    /// Create config for the public inference API.
    pub fn new(model: impl Into<String>) -> Self {
        let defaults = GenerationSettings::default();
        Self {
            base_url: defaults.api_base_url,
            model: model.into(),
            api_token: None,
            timeout: Duration::from_secs(defaults.timeout_secs),
            context_window: defaults.context_window,
        }
    }

    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self {
            base_url: settings.api_base_url.clone(),
            model: settings.model.clone(),
            api_token: settings.api_token.clone().map(SecretString::from),
            timeout: Duration::from_secs(settings.timeout_secs),
            context_window: settings.context_window,
        }
    }

    /// Full endpoint URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}

/// Inference-API-backed generator.
pub struct HfInferenceGenerator {
    client: Client,
    config: HfInferenceConfig,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    do_sample: bool,
    top_p: f32,
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncate: Option<u32>,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

impl HfInferenceGenerator {
    /// Create a new generator. Fails only if the HTTP client cannot be built.
    pub fn new(config: HfInferenceConfig) -> Result<Self, GenerationError> {
        if config.model.trim().is_empty() {
            return Err(GenerationError::ConfigError(
                "model cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_request<'a>(&self, prompt: &'a str, options: &GenerationOptions) -> InferenceRequest<'a> {
        let truncate = options
            .truncation
            .then(|| self.config.context_window.saturating_sub(options.max_new_tokens));

        InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                do_sample: options.do_sample,
                top_p: options.top_p,
                max_new_tokens: options.max_new_tokens,
                truncate,
            },
            options: InferenceOptions {
                wait_for_model: true,
                use_cache: false,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for HfInferenceGenerator {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request = self.build_request(prompt, options);
        let url = self.config.endpoint();
        debug!(model = %self.config.model, "Calling text generation API");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(token) = &self.config.api_token {
            builder = builder.header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            );
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::ApiError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::SERVICE_UNAVAILABLE {
                return Err(GenerationError::ModelUnavailable(body));
            }
            return Err(GenerationError::ApiError(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let generations: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| GenerationError::ParseError("No generations in response".to_string()))
    }
}
