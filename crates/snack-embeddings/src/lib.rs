//! # snack-embeddings
//!
//! Sentence embeddings for snack descriptions using Candle.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - all-MiniLM-L6-v2 model (384 dimensions, mean pooled, unit length)
//! - Model files fetched from the HuggingFace Hub once, then read from disk
//! - Catalog-wide document building with progress events
//! - Similarity recommendations over a stored document
//!
//! The batch and single-text paths share `EmbeddingModel::embed`, so a text
//! embedded on its own matches the vector stored for it in a batch document.

pub mod batch;
pub mod cache;
pub mod candle;
pub mod error;
pub mod mock;
pub mod model;
pub mod recommend;

pub use crate::candle::{CandleEmbedder, EMBEDDING_DIM, MAX_TOKENS};
pub use batch::{build_document, BatchProgress};
pub use cache::{ModelFile, ModelFiles, ModelStore, DEFAULT_MODEL_REPO};
pub use error::EmbeddingError;
pub use mock::MockEmbedder;
pub use model::{vectors_match, Embedding, EmbeddingModel, ModelInfo, VECTOR_TOLERANCE};
pub use recommend::{recommend, RecommendError, Recommendation};
