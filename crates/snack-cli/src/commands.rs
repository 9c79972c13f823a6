//! Command implementations for the snack tools.
//!
//! Runners take their model backend and output streams as arguments so the
//! binaries stay thin and the behavior can be exercised with mock models.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use snack_describe::{
    describe, fallback_description, resolve_snack_name, GenerationOptions, HfInferenceConfig,
    HfInferenceGenerator, TextGenerator,
};
use snack_embeddings::{
    build_document, recommend, BatchProgress, CandleEmbedder, EmbeddingError, EmbeddingModel,
    ModelStore, Recommendation,
};
use snack_types::{
    validate_vector, Catalog, EmbeddingSettings, EmbeddingsDocument, GenerationSettings,
    RecommendationSettings, Settings,
};

/// Deferred embedding-model construction.
///
/// Loading is deferred so input validation can fail before any model work.
pub type ModelLoader = Box<dyn FnOnce() -> LoadedModel>;

/// Result of running a [`ModelLoader`].
pub type LoadedModel = Result<Box<dyn EmbeddingModel>, EmbeddingError>;

/// Load settings and apply the `--log-level` override.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Catalog to embed: the CLI path, then the configured path, then the built-in list.
pub fn load_catalog(settings: &Settings, override_path: Option<&Path>) -> Result<Catalog> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(|| settings.catalog_path());

    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading catalog");
            Catalog::load(&path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))
        }
        None => Ok(Catalog::builtin()),
    }
}

/// Write `{"error": "<message>"}` on one line.
pub fn report_json_error<W: Write>(writer: &mut W, error: &anyhow::Error) {
    let payload = serde_json::json!({ "error": format!("{:#}", error) });
    let _ = writeln!(writer, "{}", payload);
}

/// Loader for the local MiniLM embedder described by `settings`.
pub fn candle_loader(settings: &EmbeddingSettings) -> ModelLoader {
    let store = ModelStore::from_settings(settings);
    Box::new(move || -> LoadedModel {
        let model = CandleEmbedder::load(&store)?;
        Ok(Box::new(model))
    })
}

/// Inference API generator for `settings`.
///
/// Fails only when the backend itself cannot be constructed.
pub fn build_generator(settings: &GenerationSettings) -> Result<HfInferenceGenerator> {
    HfInferenceGenerator::new(HfInferenceConfig::from_settings(settings))
        .context("Failed to initialize text generator")
}

/// Describe a snack and print the description as a JSON string.
///
/// Generation failures are not errors: the fallback sentence is printed and
/// the cause goes to `err`. Only write failures are returned.
pub async fn run_describe<O: Write, E: Write>(
    generator: &dyn TextGenerator,
    snack_name: Option<&str>,
    options: &GenerationOptions,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let name = resolve_snack_name(snack_name);
    let description = describe(generator, &name, options).await;

    writeln!(out, "{}", serde_json::to_string(description.text())?)?;
    if let Some(cause) = description.cause() {
        writeln!(err, "Error generating description: {}", cause)?;
    }
    Ok(())
}

/// Print the fallback sentence for `snack_name` when no generator could be
/// set up (unreadable or invalid settings), with `cause` on `err`.
pub fn run_describe_fallback<O: Write, E: Write>(
    snack_name: Option<&str>,
    cause: &anyhow::Error,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let name = resolve_snack_name(snack_name);
    writeln!(out, "{}", serde_json::to_string(&fallback_description(&name))?)?;
    writeln!(err, "Error generating description: {:#}", cause)?;
    Ok(())
}

/// Embed every catalog description and write the document to `output_path`.
///
/// Progress lines go to `err`. Returns the number of records written.
pub fn run_batch<E: Write>(
    catalog: &Catalog,
    loader: ModelLoader,
    output_path: &Path,
    err: &mut E,
) -> Result<usize> {
    writeln!(err, "Loading embedding model...")?;
    let model = loader().context("Failed to load embedding model")?;
    writeln!(err, "Model loaded successfully.")?;

    let mut write_failure = None;
    let document = build_document(catalog, model.as_ref(), |event| {
        let line = match event {
            BatchProgress::Started { total } => {
                format!("Generating embeddings for {} snacks...", total)
            }
            BatchProgress::Embedded { name, .. } => format!("Generated embedding for {}", name),
            BatchProgress::Finished { .. } => return,
        };
        if let Err(e) = writeln!(err, "{}", line) {
            write_failure.get_or_insert(e);
        }
    })?;
    if let Some(e) = write_failure {
        return Err(e.into());
    }

    document
        .write_to(output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!(path = %output_path.display(), count = document.len(), "Wrote embeddings document");
    writeln!(
        err,
        "Successfully saved {} snack embeddings to {}!",
        document.len(),
        output_path.display()
    )?;
    Ok(document.len())
}

/// Embed one text and print its vector as a JSON array.
///
/// Nothing is written to `out` unless a valid vector was produced.
pub fn run_single_embedding<O: Write>(
    text: Option<&str>,
    loader: ModelLoader,
    out: &mut O,
) -> Result<()> {
    let text = match text {
        None => bail!("Text argument required"),
        Some(text) if text.trim().is_empty() => bail!("Text cannot be empty"),
        Some(text) => text,
    };

    let model = loader()?;
    let embedding = model.embed(text)?;
    validate_vector(&embedding.values)?;

    let json = serde_json::to_string(&embedding.values)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

#[derive(Serialize)]
struct RecommendationOutput {
    recommendations: Vec<Recommendation>,
}

/// Print recommendations for `snack_name` from the document at `document_path`.
pub fn run_recommend<O: Write>(
    document_path: &Path,
    snack_name: &str,
    settings: &RecommendationSettings,
    out: &mut O,
) -> Result<usize> {
    let document = EmbeddingsDocument::load(document_path).with_context(|| {
        format!(
            "Failed to load embeddings from {}",
            document_path.display()
        )
    })?;
    let recommendations = recommend(&document, snack_name, settings)?;
    let count = recommendations.len();

    let json = serde_json::to_string(&RecommendationOutput { recommendations })?;
    writeln!(out, "{}", json)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snack_describe::MockGenerator;
    use snack_embeddings::{vectors_match, MockEmbedder};
    use tempfile::TempDir;

    fn mock_loader() -> ModelLoader {
        Box::new(|| -> LoadedModel { Ok(Box::new(MockEmbedder::default())) })
    }

    fn failing_loader() -> ModelLoader {
        Box::new(|| -> LoadedModel {
            Err(EmbeddingError::InvalidModel("config.json".to_string()))
        })
    }

    fn panicking_loader() -> ModelLoader {
        Box::new(|| -> LoadedModel { panic!("model must not load for invalid input") })
    }

    #[test]
    fn test_report_json_error() {
        let mut buf = Vec::new();
        let error = anyhow::anyhow!("disk full").context("Failed to write");
        report_json_error(&mut buf, &error);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"], "Failed to write: disk full");
    }

    #[test]
    fn test_load_catalog_default_is_builtin() {
        let catalog = load_catalog(&Settings::default(), None).unwrap();
        assert_eq!(catalog.len(), Catalog::builtin().len());
    }

    #[test]
    fn test_load_catalog_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snacks.json");
        std::fs::write(
            &path,
            r#"[{"name": "Juju Dhau", "description": "King curd from Bhaktapur", "category": "Dessert"}]"#,
        )
        .unwrap();

        let catalog = load_catalog(&Settings::default(), Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Juju Dhau").unwrap().emoji, "🍬");
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let result = load_catalog(&Settings::default(), Some(Path::new("/no/such/snacks.json")));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_describe_generated() {
        let generator = MockGenerator::echoing("Steamy dumplings of joy 🥟");
        let mut out = Vec::new();
        let mut err = Vec::new();

        run_describe(
            &generator,
            Some("Momo"),
            &GenerationOptions::default(),
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        let text: String = serde_json::from_slice(&out).unwrap();
        assert_eq!(text, "Steamy dumplings of joy 🥟");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_run_describe_fallback() {
        let generator = MockGenerator::failing("model offline");
        let mut out = Vec::new();
        let mut err = Vec::new();

        run_describe(
            &generator,
            Some("Momo"),
            &GenerationOptions::default(),
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"Momo is a delicious Nepali snack.\"\n"
        );
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("Error generating description:"));
        assert!(err.contains("model offline"));
    }

    #[tokio::test]
    async fn test_run_describe_blank_name_uses_default() {
        let generator = MockGenerator::failing("model offline");
        let mut out = Vec::new();
        let mut err = Vec::new();

        run_describe(
            &generator,
            Some("   "),
            &GenerationOptions::default(),
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        let text: String = serde_json::from_slice(&out).unwrap();
        assert_eq!(text, "A Nepali snack is a delicious Nepali snack.");
    }

    #[test]
    fn test_run_describe_fallback_without_generator() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let cause = anyhow::anyhow!("generation.top_p must be in (0, 1], got 5")
            .context("Failed to load configuration");

        run_describe_fallback(Some("Sekuwa"), &cause, &mut out, &mut err).unwrap();

        let text: String = serde_json::from_slice(&out).unwrap();
        assert_eq!(text, "Sekuwa is a delicious Nepali snack.");
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("Error generating description: Failed to load configuration"));
        assert!(err.contains("top_p"));

        let mut out = Vec::new();
        run_describe_fallback(None, &cause, &mut out, &mut Vec::new()).unwrap();
        let text: String = serde_json::from_slice(&out).unwrap();
        assert_eq!(text, "A Nepali snack is a delicious Nepali snack.");
    }

    #[test]
    fn test_run_batch_writes_document() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        let catalog = Catalog::builtin();
        let mut err = Vec::new();

        let count = run_batch(&catalog, mock_loader(), &output, &mut err).unwrap();
        assert_eq!(count, catalog.len());

        let document = EmbeddingsDocument::load(&output).unwrap();
        let names: Vec<&str> = document.names().collect();
        let expected: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, expected);

        let progress = String::from_utf8(err).unwrap();
        let lines: Vec<&str> = progress.lines().collect();
        assert_eq!(lines[0], "Loading embedding model...");
        assert_eq!(lines[1], "Model loaded successfully.");
        assert_eq!(
            lines[2],
            format!("Generating embeddings for {} snacks...", catalog.len())
        );
        assert_eq!(lines[3], "Generated embedding for Momo");
        assert!(lines
            .last()
            .unwrap()
            .starts_with(&format!("Successfully saved {} snack embeddings to", catalog.len())));
    }

    #[test]
    fn test_run_batch_load_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        let mut err = Vec::new();

        let result = run_batch(&Catalog::builtin(), failing_loader(), &output, &mut err);
        assert!(result.is_err());
        assert!(!output.exists());
        assert_eq!(String::from_utf8(err).unwrap(), "Loading embedding model...\n");
    }

    #[test]
    fn test_run_batch_mid_run_failure_keeps_previous_document() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        std::fs::write(&output, "{}").unwrap();

        let loader: ModelLoader = Box::new(|| -> LoadedModel {
            Ok(Box::new(MockEmbedder::default().failing_on("buckwheat")))
        });
        let mut err = Vec::new();
        let result = run_batch(&Catalog::builtin(), loader, &output, &mut err);

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}");
    }

    #[test]
    fn test_run_single_embedding_prints_array() {
        let mut out = Vec::new();
        run_single_embedding(Some("spicy potato salad"), mock_loader(), &mut out).unwrap();

        let vector: Vec<f32> = serde_json::from_slice(&out).unwrap();
        assert_eq!(vector.len(), 32);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_run_single_embedding_rejects_missing_and_blank() {
        let mut out = Vec::new();

        let missing = run_single_embedding(None, panicking_loader(), &mut out).unwrap_err();
        assert_eq!(missing.to_string(), "Text argument required");

        let empty = run_single_embedding(Some(""), panicking_loader(), &mut out).unwrap_err();
        assert_eq!(empty.to_string(), "Text cannot be empty");

        let blank = run_single_embedding(Some(" \t "), panicking_loader(), &mut out).unwrap_err();
        assert_eq!(blank.to_string(), "Text cannot be empty");

        assert!(out.is_empty());
    }

    #[test]
    fn test_run_single_embedding_model_failure_prints_nothing() {
        let mut out = Vec::new();
        assert!(run_single_embedding(Some("Momo"), failing_loader(), &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_matches_batch() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        let catalog = Catalog::builtin();
        run_batch(&catalog, mock_loader(), &output, &mut Vec::new()).unwrap();
        let document = EmbeddingsDocument::load(&output).unwrap();

        for snack in catalog.iter() {
            let mut out = Vec::new();
            run_single_embedding(Some(&snack.description), mock_loader(), &mut out).unwrap();
            let single: Vec<f32> = serde_json::from_slice(&out).unwrap();
            let stored = &document.get(&snack.name).unwrap().vector;
            assert!(vectors_match(&single, stored), "mismatch for {}", snack.name);
        }
    }

    #[test]
    fn test_run_recommend() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        run_batch(&Catalog::builtin(), mock_loader(), &output, &mut Vec::new()).unwrap();

        let settings = RecommendationSettings {
            similarity_threshold: 0.0,
            ..Default::default()
        };
        let mut out = Vec::new();
        let count = run_recommend(&output, "Momo", &settings, &mut out).unwrap();
        assert!(count <= settings.max_results);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let recommendations = value["recommendations"].as_array().unwrap();
        assert_eq!(recommendations.len(), count);
        assert!(recommendations.iter().all(|r| r["name"] != "Momo"));
    }

    #[test]
    fn test_run_recommend_unknown_snack() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("snack_embeddings.json");
        run_batch(&Catalog::builtin(), mock_loader(), &output, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        let error = run_recommend(
            &output,
            "Pizza",
            &RecommendationSettings::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(error.to_string().contains("Pizza"));
        assert!(out.is_empty());
    }
}
