//! Similarity recommendations over an embeddings document.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use snack_types::{validate_vector, Category, EmbeddingsDocument, RecommendationSettings};

use crate::model::Embedding;

/// Error type for recommendation lookups.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Snack '{0}' not found")]
    NotFound(String),

    #[error("Snack '{name}' has an invalid embedding vector: {reason}")]
    InvalidVector { name: String, reason: String },
}

/// One recommended snack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub emoji: String,
    pub category: Category,
    pub score: f32,
}

/// Rank the other snacks in `document` by similarity to `name`.
///
/// Score is cosine similarity plus `category_boost` on a category match,
/// capped at 1.0. Snacks below `similarity_threshold` are dropped, and
/// records with unusable vectors are skipped.
pub fn recommend(
    document: &EmbeddingsDocument,
    name: &str,
    settings: &RecommendationSettings,
) -> Result<Vec<Recommendation>, RecommendError> {
    let target = document
        .get(name)
        .ok_or_else(|| RecommendError::NotFound(name.to_string()))?;
    validate_vector(&target.vector).map_err(|e| RecommendError::InvalidVector {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let target_embedding = Embedding::new(target.vector.clone());

    let mut recommendations: Vec<Recommendation> = document
        .iter()
        .filter(|(other, _)| *other != name)
        .filter_map(|(other, record)| {
            if let Err(e) = validate_vector(&record.vector) {
                warn!(snack = other, error = %e, "Skipping snack with invalid vector");
                return None;
            }
            if record.vector.len() != target.vector.len() {
                warn!(
                    snack = other,
                    expected = target.vector.len(),
                    actual = record.vector.len(),
                    "Skipping snack with mismatched vector length"
                );
                return None;
            }

            let mut score =
                target_embedding.cosine_similarity(&Embedding::new(record.vector.clone()));
            if record.category == target.category {
                score += settings.category_boost;
            }

            Some(Recommendation {
                name: other.to_string(),
                emoji: record.emoji.clone(),
                category: record.category,
                score: score.min(1.0),
            })
        })
        .filter(|rec| rec.score >= settings.similarity_threshold)
        .collect();

    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    recommendations.truncate(settings.max_results);

    debug!(snack = name, count = recommendations.len(), "Generated recommendations");
    Ok(recommendations)
}
