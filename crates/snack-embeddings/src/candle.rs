//! all-MiniLM-L6-v2 on Candle.
//!
//! One text per forward pass, no padding. The token vectors are averaged
//! under the attention mask and the result is scaled to unit length, which
//! reproduces sentence-transformers' `encode` for this model.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::cache::{ModelFiles, ModelStore};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Vector length of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Token limit applied before the forward pass.
pub const MAX_TOKENS: usize = 256;

/// Sentence embedder backed by a local BERT model.
pub struct CandleEmbedder {
    bert: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the model kept in `store`, fetching files on first use.
    pub fn load(store: &ModelStore) -> Result<Self, EmbeddingError> {
        let files = store.fetch()?;
        Self::from_files(store.model_name(), &files)
    }

    pub fn from_files(name: &str, files: &ModelFiles) -> Result<Self, EmbeddingError> {
        info!(model = name, "Loading embedding model");
        let device = Device::Cpu;

        let config = read_bert_config(&files.config)?;
        let tokenizer = read_tokenizer(&files.tokenizer)?;
        // Safety: the weights file is not modified while mapped.
        let weights = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)?
        };
        let bert = BertModel::load(weights, &config)?;

        debug!(dim = config.hidden_size, "Embedding model ready");
        Ok(Self {
            bert,
            tokenizer,
            device,
            info: ModelInfo {
                name: name.to_string(),
                dimension: config.hidden_size,
                max_tokens: MAX_TOKENS,
            },
        })
    }

    /// Token ids and attention mask as `(1, seq_len)` tensors.
    fn encode(&self, text: &str) -> Result<(Tensor, Tensor), EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        let len = encoding.get_ids().len();
        debug!(tokens = len, "Tokenized text");

        let ids = Tensor::new(encoding.get_ids(), &self.device)?.reshape((1, len))?;
        let mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.reshape((1, len))?;
        Ok((ids, mask))
    }
}

fn read_bert_config(path: &Path) -> Result<BertConfig, EmbeddingError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| EmbeddingError::InvalidModel(format!("{}: {}", path.display(), e)))
}

/// Tokenizer truncating at [`MAX_TOKENS`] (the closing [SEP] is kept) and
/// never padding.
fn read_tokenizer(path: &Path) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer =
        Tokenizer::from_file(path).map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

/// Average of `hidden` (batch, seq, dim) over positions where `mask` is set.
fn masked_mean(hidden: &Tensor, mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let weights = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
    let counts = weights.sum(1)?.clamp(1e-9, f64::MAX)?;
    Ok(summed.broadcast_div(&counts)?)
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let (ids, mask) = self.encode(text)?;
        let token_types = ids.zeros_like()?;
        let hidden = self.bert.forward(&ids, &token_types, Some(&mask))?;

        let values = masked_mean(&hidden, &mask)?.squeeze(0)?.to_vec1::<f32>()?;
        if values.len() != self.info.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.info.dimension,
                actual: values.len(),
            });
        }
        Ok(Embedding::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vectors_match;

    fn embedder() -> CandleEmbedder {
        CandleEmbedder::load(&ModelStore::default()).unwrap()
    }

    #[test]
    fn test_masked_mean_ignores_masked_tokens() {
        let device = Device::Cpu;
        let hidden = Tensor::new(&[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]], &device).unwrap();
        let mask = Tensor::new(&[[1u32, 1, 0]], &device).unwrap();

        let mean = masked_mean(&hidden, &mask).unwrap();
        assert_eq!(mean.to_vec2::<f32>().unwrap(), vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            read_bert_config(&path),
            Err(EmbeddingError::InvalidModel(_))
        ));
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_load_model() {
        let embedder = embedder();
        assert_eq!(embedder.info().dimension, EMBEDDING_DIM);
        assert_eq!(embedder.info().name, "all-MiniLM-L6-v2");
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embedding_is_unit_length() {
        let emb = embedder()
            .embed("Crispy hollow puris filled with spiced potatoes.")
            .unwrap();
        assert_eq!(emb.dimension(), EMBEDDING_DIM);
        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embedding_is_deterministic() {
        let embedder = embedder();
        let text = "Sweet dumpling made from rice flour and filled with jaggery.";
        let first = embedder.embed(text).unwrap();
        let second = embedder.embed(text).unwrap();
        assert!(vectors_match(&first.values, &second.values));
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_related_descriptions_score_higher() {
        let embedder = embedder();
        let momo = embedder.embed("Steamed dumplings filled with buffalo meat").unwrap();
        let buff = embedder.embed("Dumplings stuffed with buff, steamed").unwrap();
        let unrelated = embedder.embed("Python programming language").unwrap();

        assert!(momo.cosine_similarity(&buff) > momo.cosine_similarity(&unrelated));
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_long_text_is_truncated() {
        let text = "spicy momo ".repeat(400);
        let emb = embedder().embed(&text).unwrap();
        assert_eq!(emb.dimension(), EMBEDDING_DIM);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_blank_text_rejected() {
        assert!(matches!(embedder().embed("   "), Err(EmbeddingError::EmptyText)));
    }
}
