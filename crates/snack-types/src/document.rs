//! Embeddings document.
//!
//! Maps each snack name to its vector and catalog metadata. Serialized as a
//! JSON object keyed by name, in catalog order, pretty-printed with 2-space
//! indentation.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tempfile::NamedTempFile;

use crate::catalog::{Category, Snack};
use crate::error::SnackError;

/// Vector plus the catalog fields stored for one snack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub vector: Vec<f32>,
    pub emoji: String,
    pub category: Category,
    pub description: String,
}

impl EmbeddingRecord {
    /// Pair a snack's metadata with its computed vector.
    pub fn from_snack(snack: &Snack, vector: Vec<f32>) -> Self {
        Self {
            vector,
            emoji: snack.emoji.clone(),
            category: snack.category,
            description: snack.description.clone(),
        }
    }
}

/// Check that a vector is non-empty and every component is finite.
pub fn validate_vector(vector: &[f32]) -> Result<(), SnackError> {
    if vector.is_empty() {
        return Err(SnackError::InvalidVector("vector is empty".to_string()));
    }
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(SnackError::InvalidVector(format!(
            "non-finite value at index {}",
            pos
        )));
    }
    Ok(())
}

/// Ordered name -> record mapping with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingsDocument {
    entries: Vec<(String, EmbeddingRecord)>,
}

impl EmbeddingsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Names must be unique.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        record: EmbeddingRecord,
    ) -> Result<(), SnackError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(SnackError::InvalidCatalog(format!(
                "duplicate snack name '{}'",
                name
            )));
        }
        self.entries.push((name, record));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EmbeddingRecord> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmbeddingRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Vector length shared by all records, or `None` when empty or ragged.
    pub fn dimension(&self) -> Option<usize> {
        let first = self.entries.first()?.1.vector.len();
        self.entries
            .iter()
            .all(|(_, r)| r.vector.len() == first)
            .then_some(first)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnackError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SnackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document, replacing `path` atomically.
    ///
    /// The JSON goes to a temporary file in the same directory first, so an
    /// interrupted write never leaves a truncated document behind.
    pub fn write_to(&self, path: &Path) -> Result<(), SnackError> {
        let json = self.to_json_pretty()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SnackError::Io(e.error))?;
        Ok(())
    }
}

impl Serialize for EmbeddingsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmbeddingsDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = EmbeddingsDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of snack names to embedding records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut doc = EmbeddingsDocument::new();
                while let Some((name, record)) = access.next_entry::<String, EmbeddingRecord>()? {
                    doc.insert(name, record).map_err(serde::de::Error::custom)?;
                }
                Ok(doc)
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}
