//! Snack description generation with fallback.

use tracing::{debug, warn};

use crate::generator::{GenerationError, GenerationOptions, TextGenerator};

/// Name used when no usable snack name is given.
pub const DEFAULT_SNACK_NAME: &str = "A Nepali snack";

/// Outcome of a description request.
#[derive(Debug)]
pub enum Description {
    /// Text produced by the model, prompt echo removed
    Generated(String),
    /// Templated sentence used because generation failed
    Fallback {
        text: String,
        cause: GenerationError,
    },
}

impl Description {
    /// The sentence to emit, whichever way it was produced.
    pub fn text(&self) -> &str {
        match self {
            Description::Generated(text) => text,
            Description::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Description::Fallback { .. })
    }

    /// The generation error behind a fallback.
    pub fn cause(&self) -> Option<&GenerationError> {
        match self {
            Description::Generated(_) => None,
            Description::Fallback { cause, .. } => Some(cause),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Description::Generated(text) => text,
            Description::Fallback { text, .. } => text,
        }
    }
}

/// Effective snack name: the argument unless it is missing or blank.
pub fn resolve_snack_name(arg: Option<&str>) -> String {
    match arg {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => DEFAULT_SNACK_NAME.to_string(),
    }
}

/// Instruction prompt for `name`.
pub fn build_prompt(name: &str) -> String {
    format!(
        "Write a short, fun, one-sentence description for the Nepali snack '{}' including an emoji.",
        name
    )
}

/// Trim the continuation and drop a leading copy of `prompt`.
pub fn strip_prompt_echo(generated: &str, prompt: &str) -> String {
    let trimmed = generated.trim();
    match trimmed.strip_prefix(prompt) {
        Some(rest) => rest.trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Deterministic sentence used when generation fails.
pub fn fallback_description(name: &str) -> String {
    format!("{} is a delicious Nepali snack.", name)
}

/// Describe `name` with `generator`, falling back on any generation failure.
///
/// A continuation that is empty once the echoed prompt is removed counts as
/// a failure, so the returned text is never empty.
pub async fn describe(
    generator: &dyn TextGenerator,
    name: &str,
    options: &GenerationOptions,
) -> Description {
    let prompt = build_prompt(name);
    debug!(model = generator.model(), snack = name, "Generating description");

    let outcome = generator
        .generate(&prompt, options)
        .await
        .map(|generated| strip_prompt_echo(&generated, &prompt))
        .and_then(|text| {
            if text.is_empty() {
                Err(GenerationError::EmptyOutput)
            } else {
                Ok(text)
            }
        });

    match outcome {
        Ok(text) => Description::Generated(text),
        Err(cause) => {
            warn!(snack = name, error = %cause, "Falling back to templated description");
            Description::Fallback {
                text: fallback_description(name),
                cause,
            }
        }
    }
}
