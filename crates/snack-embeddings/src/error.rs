//! Embedding error types.

use snack_types::SnackError;
use thiserror::Error;

/// Failures while loading an embedding model or embedding text.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Model backend error: {0}")]
    Backend(#[from] candle_core::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model files present but unusable
    #[error("Invalid model files: {0}")]
    InvalidModel(String),

    #[error("Failed to fetch {file} from {repo}: {reason}")]
    Fetch {
        repo: String,
        file: String,
        reason: String,
    },

    #[error("Model cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text cannot be empty")]
    EmptyText,

    /// The backend refused a particular text
    #[error("Cannot embed text: {0}")]
    Rejected(String),

    #[error("Embedding has {actual} dimensions, model declares {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Snack(#[from] SnackError),
}
