//! Error type for catalog, document and settings operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnackError {
    /// Settings could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Duplicate, blank or over-long snack entries
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Empty vector or non-finite component
    #[error("Invalid vector: {0}")]
    InvalidVector(String),
}
