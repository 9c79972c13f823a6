//! The embedding capability shared by the batch and single-text tools.

use crate::error::EmbeddingError;

/// Largest per-component difference at which two vectors count as the same
/// embedding.
pub const VECTOR_TOLERANCE: f32 = 1e-5;

/// A sentence vector scaled to unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Scale `values` to unit length. An all-zero vector is kept as is.
    pub fn new(mut values: Vec<f32>) -> Self {
        let norm = dot(&values, &values).sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        Self { values }
    }

    /// Wrap a vector that is already unit length.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// Cosine similarity in [-1, 1]; 0.0 when the lengths differ.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        dot(&self.values, &other.values)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Static description of an embedding backend.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Short model name, e.g. "all-MiniLM-L6-v2"
    pub name: String,
    /// Length of every vector the model returns
    pub dimension: usize,
    /// Input is truncated to this many tokens
    pub max_tokens: usize,
}

/// One text in, one unit vector out.
///
/// Implementations must be deterministic for a given text: the batch tool and
/// the single-text tool both call `embed` and their outputs are compared.
pub trait EmbeddingModel: Send + Sync {
    fn info(&self) -> &ModelInfo;

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

/// True when both vectors have the same length and every component is within
/// [`VECTOR_TOLERANCE`].
pub fn vectors_match(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x - y).abs() <= VECTOR_TOLERANCE)
}
