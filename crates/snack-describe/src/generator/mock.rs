//! Mock generator for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationError, GenerationOptions, TextGenerator};

enum Behavior {
    Fixed(String),
    EchoPrompt(String),
    Fail(String),
}

/// Mock generator with scripted output.
///
/// Records every prompt and option set it receives.
pub struct MockGenerator {
    behavior: Behavior,
    calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockGenerator {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always return `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fixed(text.into()))
    }

    /// Return the prompt followed by `continuation`, like a model that
    /// includes its input in the output.
    pub fn echoing(continuation: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::EchoPrompt(continuation.into()))
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Prompts and options received so far.
    pub fn calls(&self) -> Vec<(String, GenerationOptions)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn model(&self) -> &str {
        "mock-generator"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((prompt.to_string(), options.clone()));

        match &self.behavior {
            Behavior::Fixed(text) => Ok(text.clone()),
            Behavior::EchoPrompt(continuation) => Ok(format!("{} {}", prompt, continuation)),
            Behavior::Fail(message) => Err(GenerationError::ApiError(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fixed() {
        let generator = MockGenerator::new("Tasty!");
        let options = GenerationOptions::default();
        assert_eq!(generator.generate("p", &options).await.unwrap(), "Tasty!");
        assert_eq!(generator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_echoing() {
        let generator = MockGenerator::echoing("Yum 🥟");
        let text = generator
            .generate("Describe momo.", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "Describe momo. Yum 🥟");
    }

    #[tokio::test]
    async fn test_mock_failing_records_call() {
        let generator = MockGenerator::failing("offline");
        let result = generator.generate("p", &GenerationOptions::default()).await;
        assert!(matches!(result, Err(GenerationError::ApiError(msg)) if msg == "offline"));
        assert_eq!(generator.calls()[0].0, "p");
    }
}
