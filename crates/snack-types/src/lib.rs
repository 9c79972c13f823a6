//! # snack-types
//!
//! Shared domain types for the Nepali snack tools.
//!
//! - Catalog: the built-in list of snack records and its validation rules
//! - Embeddings document: name -> vector record mapping written by the batch tool
//! - Settings: layered configuration shared by every binary
//!
//! ## Usage
//!
//! ```rust
//! use snack_types::Catalog;
//!
//! let catalog = Catalog::builtin();
//! assert!(catalog.get("Momo").is_some());
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;

pub use catalog::{Catalog, Category, Snack, MAX_NAME_LEN};
pub use config::{EmbeddingSettings, GenerationSettings, RecommendationSettings, Settings};
pub use document::{validate_vector, EmbeddingRecord, EmbeddingsDocument};
pub use error::SnackError;
