//! On-disk store for sentence-transformer model files.
//!
//! Files are fetched from the HuggingFace Hub on first use and copied into
//! `<cache_dir>/<repo id with '/' replaced by '_'>/`. Later runs only fetch
//! files that are missing.

use std::path::PathBuf;

use tracing::{debug, info};

use snack_types::EmbeddingSettings;

use crate::error::EmbeddingError;

/// Repository fetched when no other is configured.
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// A file a BERT sentence-transformer needs to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFile {
    Config,
    Tokenizer,
    Weights,
}

impl ModelFile {
    pub const ALL: [ModelFile; 3] = [ModelFile::Config, ModelFile::Tokenizer, ModelFile::Weights];

    /// File name inside the model repository.
    pub fn file_name(self) -> &'static str {
        match self {
            ModelFile::Config => "config.json",
            ModelFile::Tokenizer => "tokenizer.json",
            ModelFile::Weights => "model.safetensors",
        }
    }
}

/// Local paths of a complete model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Where one model repository is kept on disk.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
    repo_id: String,
}

fn platform_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("nepali-snacks")
        .join("models")
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(platform_cache_dir(), DEFAULT_MODEL_REPO)
    }
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Store described by `embedding.*` settings; the platform cache dir is
    /// used when `cache_dir` is unset.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        let root = settings
            .cache_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(platform_cache_dir);
        Self::new(root, settings.model_repo.as_str())
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Last segment of the repo id, e.g. "all-MiniLM-L6-v2".
    pub fn model_name(&self) -> &str {
        self.repo_id.rsplit('/').next().unwrap_or(&self.repo_id)
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root.join(self.repo_id.replace('/', "_"))
    }

    pub fn path(&self, file: ModelFile) -> PathBuf {
        self.model_dir().join(file.file_name())
    }

    /// Files not yet present locally.
    pub fn missing(&self) -> Vec<ModelFile> {
        ModelFile::ALL
            .into_iter()
            .filter(|file| !self.path(*file).is_file())
            .collect()
    }

    /// Local paths of every model file, fetching whatever is missing.
    pub fn fetch(&self) -> Result<ModelFiles, EmbeddingError> {
        let missing = self.missing();
        if missing.is_empty() {
            debug!(dir = %self.model_dir().display(), "Model files already cached");
        } else {
            info!(repo = %self.repo_id, count = missing.len(), "Fetching model files");
            self.download(&missing)?;
        }

        Ok(ModelFiles {
            config: self.path(ModelFile::Config),
            tokenizer: self.path(ModelFile::Tokenizer),
            weights: self.path(ModelFile::Weights),
        })
    }

    fn download(&self, files: &[ModelFile]) -> Result<(), EmbeddingError> {
        use hf_hub::api::sync::Api;

        let fetch_error = |file: &str, reason: String| EmbeddingError::Fetch {
            repo: self.repo_id.clone(),
            file: file.to_string(),
            reason,
        };

        let api = Api::new().map_err(|e| fetch_error("*", e.to_string()))?;
        let repo = api.model(self.repo_id.clone());
        std::fs::create_dir_all(self.model_dir())?;

        for file in files {
            let name = file.file_name();
            let hub_path = repo.get(name).map_err(|e| fetch_error(name, e.to_string()))?;
            std::fs::copy(&hub_path, self.path(*file))?;
            debug!(file = name, "Stored model file");
        }
        Ok(())
    }
}
