//! Catalog-wide embedding.
//!
//! Embeds every catalog description, one text at a time, and collects the
//! results into an [`EmbeddingsDocument`]. The run is all-or-nothing: the
//! first failure aborts and no partial document is returned.

use tracing::debug;

use snack_types::{validate_vector, Catalog, EmbeddingRecord, EmbeddingsDocument};

use crate::error::EmbeddingError;
use crate::model::EmbeddingModel;

/// Progress events emitted while building a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchProgress<'a> {
    /// About to embed `total` descriptions
    Started { total: usize },
    /// Finished one snack (`completed` of `total`)
    Embedded {
        name: &'a str,
        completed: usize,
        total: usize,
    },
    /// All descriptions embedded
    Finished { count: usize },
}

/// Embed every description in `catalog`.
///
/// Every vector must be valid and as long as `model.info().dimension`, so
/// the returned document always has uniform vector length.
pub fn build_document<F>(
    catalog: &Catalog,
    model: &dyn EmbeddingModel,
    mut on_progress: F,
) -> Result<EmbeddingsDocument, EmbeddingError>
where
    F: FnMut(BatchProgress<'_>),
{
    let total = catalog.len();
    let expected = model.info().dimension;
    on_progress(BatchProgress::Started { total });

    let mut document = EmbeddingsDocument::new();
    for (i, snack) in catalog.iter().enumerate() {
        let embedding = model.embed(&snack.description)?;
        if embedding.dimension() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: embedding.dimension(),
            });
        }
        validate_vector(&embedding.values)?;

        debug!(name = %snack.name, dim = expected, "Embedded description");
        document.insert(
            snack.name.clone(),
            EmbeddingRecord::from_snack(snack, embedding.into_vec()),
        )?;
        on_progress(BatchProgress::Embedded {
            name: &snack.name,
            completed: i + 1,
            total,
        });
    }

    on_progress(BatchProgress::Finished {
        count: document.len(),
    });
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbedder;
    use crate::model::{vectors_match, Embedding, ModelInfo};
    use snack_types::{Category, Snack};

    #[test]
    fn test_build_document_covers_catalog() {
        let catalog = Catalog::builtin();
        let embedder = MockEmbedder::new(24);

        let document = build_document(&catalog, &embedder, |_| {}).unwrap();

        assert_eq!(document.len(), catalog.len());
        assert_eq!(document.dimension(), Some(24));
        for snack in catalog.iter() {
            let record = document.get(&snack.name).unwrap();
            assert_eq!(record.emoji, snack.emoji);
            assert_eq!(record.category, snack.category);
            assert_eq!(record.description, snack.description);
        }
    }

    #[test]
    fn test_batch_vector_matches_single_embed() {
        let catalog = Catalog::builtin();
        let embedder = MockEmbedder::default();
        let document = build_document(&catalog, &embedder, |_| {}).unwrap();

        let momo = catalog.get("Momo").unwrap();
        let single = embedder.embed(&momo.description).unwrap();
        assert!(vectors_match(
            &single.values,
            &document.get("Momo").unwrap().vector
        ));
    }

    #[test]
    fn test_progress_events() {
        let catalog = Catalog::new(vec![
            Snack::new("Momo", "Steamed dumplings", "🥟", Category::StreetFood),
            Snack::new("Yomari", "Sweet dumpling", "🍬", Category::Dessert),
        ])
        .unwrap();
        let embedder = MockEmbedder::default();

        let mut events = Vec::new();
        build_document(&catalog, &embedder, |event| {
            events.push(match event {
                BatchProgress::Started { total } => format!("start {}", total),
                BatchProgress::Embedded { name, completed, total } => {
                    format!("{} {}/{}", name, completed, total)
                }
                BatchProgress::Finished { count } => format!("done {}", count),
            })
        })
        .unwrap();

        assert_eq!(events, vec!["start 2", "Momo 1/2", "Yomari 2/2", "done 2"]);
    }

    #[test]
    fn test_failure_aborts_batch() {
        let catalog = Catalog::builtin();
        let embedder = MockEmbedder::default().failing_on("buckwheat");

        let mut finished = false;
        let result = build_document(&catalog, &embedder, |event| {
            if matches!(event, BatchProgress::Finished { .. }) {
                finished = true;
            }
        });

        assert!(matches!(result, Err(EmbeddingError::Rejected(_))));
        assert!(!finished);
    }

    /// Reports dimension 2 but returns 3 values.
    struct WrongDimensionEmbedder {
        info: ModelInfo,
    }

    impl EmbeddingModel for WrongDimensionEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![1.0; 3]))
        }
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let catalog = Catalog::builtin();
        let embedder = WrongDimensionEmbedder {
            info: ModelInfo {
                name: "wrong-dimension".to_string(),
                dimension: 2,
                max_tokens: 16,
            },
        };
        let result = build_document(&catalog, &embedder, |_| {});
        assert!(matches!(result, Err(EmbeddingError::DimensionMismatch { .. })));
    }

    struct NanEmbedder {
        info: ModelInfo,
    }

    impl EmbeddingModel for NanEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::from_normalized(vec![f32::NAN, 0.0]))
        }
    }

    #[test]
    fn test_invalid_vector_rejected() {
        let catalog = Catalog::builtin();
        let embedder = NanEmbedder {
            info: ModelInfo {
                name: "nan".to_string(),
                dimension: 2,
                max_tokens: 16,
            },
        };
        let result = build_document(&catalog, &embedder, |_| {});
        assert!(matches!(result, Err(EmbeddingError::Snack(_))));
    }
}
