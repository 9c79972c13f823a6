//! Mock embedder for testing.

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Mock embedder that hashes words into a fixed number of buckets.
///
/// Deterministic and model-free: texts sharing words get similar vectors.
pub struct MockEmbedder {
    info: ModelInfo,
    /// Texts containing this marker fail to embed
    fail_marker: Option<String>,
}

impl MockEmbedder {
    /// Create a new mock embedder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "mock-embedder".to_string(),
                dimension,
                max_tokens: 256,
            },
            fail_marker: None,
        }
    }

    /// Fail on any text containing `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(32)
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(EmbeddingError::Rejected(format!(
                    "mock embedder refused text containing '{}'",
                    marker
                )));
            }
        }

        let mut values = vec![0.0f32; self.info.dimension];
        for word in text.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if word.is_empty() {
                continue;
            }
            let bucket = (fnv1a(word.as_bytes()) % self.info.dimension as u64) as usize;
            values[bucket] += 1.0;
        }

        Ok(Embedding::new(values))
    }
}

/// FNV-1a, stable across runs and platforms.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_dimension_and_norm() {
        let embedder = MockEmbedder::new(16);
        let emb = embedder.embed("Spicy puffed rice with potatoes").unwrap();
        assert_eq!(emb.dimension(), 16);
        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mock_is_deterministic() {
        let embedder = MockEmbedder::default();
        let a = embedder.embed("Grilled meat skewers").unwrap();
        let b = embedder.embed("Grilled meat skewers").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mock_ignores_case_and_punctuation() {
        let embedder = MockEmbedder::default();
        let a = embedder.embed("Sweet, crispy bread.").unwrap();
        let b = embedder.embed("sweet crispy BREAD").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mock_failure_marker() {
        let embedder = MockEmbedder::default().failing_on("buckwheat");
        assert!(embedder.embed("rice flour").is_ok());
        assert!(matches!(
            embedder.embed("buckwheat flour"),
            Err(EmbeddingError::Rejected(_))
        ));
    }

    #[test]
    fn test_mock_rejects_blank() {
        let embedder = MockEmbedder::default();
        assert!(matches!(embedder.embed("  "), Err(EmbeddingError::EmptyText)));
    }
}
