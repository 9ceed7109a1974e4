//! Metadata Extraction
//!
//! Combines file-system facts about the input (size, timestamps) with the
//! format-specific fields reported by the extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::extractors::ExtractionResult;
use crate::processor::DocumentSource;
use crate::{IngestionError, Result};

/// Document metadata.
///
/// Serializes as a single flat map: the universal fields followed by the
/// format-specific `extra` entries (`page_count`, `pdf_info`,
/// `paragraph_count`, `word_count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Declared file-type tag, lowercase
    pub file_type: String,
    /// Size of the input in bytes
    pub file_size: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
    /// Format-specific fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    /// Look up any field by its key
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        match key {
            "file_type" => Some(serde_json::json!(self.file_type)),
            "file_size" => Some(serde_json::json!(self.file_size)),
            "created_at" => Some(serde_json::json!(self.created_at)),
            "modified_at" => Some(serde_json::json!(self.modified_at)),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Flatten into a key-value map
    pub fn to_map(&self) -> BTreeMap<String, serde_json::Value> {
        let mut map = self.extra.clone();
        for key in ["file_type", "file_size", "created_at", "modified_at"] {
            if let Some(value) = self.get(key) {
                map.insert(key.to_string(), value);
            }
        }
        map
    }
}

/// Builds [`DocumentMetadata`] for a document source
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata for `source`.
    ///
    /// Paths are stat'ed; a file that cannot be stat'ed fails with
    /// [`IngestionError::Metadata`]. In-memory sources use the caller's
    /// timestamps.
    pub fn extract(
        &self,
        source: &DocumentSource,
        file_type: &str,
        extraction: &ExtractionResult,
    ) -> Result<DocumentMetadata> {
        let (file_size, created_at, modified_at) = match source {
            DocumentSource::Path(path) => stat(path)?,
            DocumentSource::Bytes {
                data,
                created_at,
                modified_at,
            } => (data.len() as u64, *created_at, *modified_at),
        };

        debug!(
            file_type = %file_type,
            file_size = file_size,
            extra_fields = extraction.metadata.len(),
            "Extracted metadata"
        );

        Ok(DocumentMetadata {
            file_type: file_type.to_ascii_lowercase(),
            file_size,
            created_at,
            modified_at,
            extra: extraction.metadata.clone(),
        })
    }
}

fn stat(path: &Path) -> Result<(u64, DateTime<Utc>, DateTime<Utc>)> {
    let metadata_error = |source| IngestionError::Metadata {
        input: path.display().to_string(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(metadata_error)?;
    let modified = metadata.modified().map_err(metadata_error)?;
    // Not every file system records a birth time.
    let created = metadata.created().unwrap_or(modified);

    Ok((
        metadata.len(),
        DateTime::<Utc>::from(created),
        DateTime::<Utc>::from(modified),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytes_source_uses_caller_timestamps() {
        let created = Utc::now() - chrono::Duration::days(2);
        let modified = Utc::now();
        let source = DocumentSource::Bytes {
            data: b"hello".to_vec(),
            created_at: created,
            modified_at: modified,
        };

        let metadata = MetadataExtractor::new()
            .extract(&source, "TXT", &ExtractionResult::new("hello"))
            .unwrap();

        assert_eq!(metadata.file_type, "txt");
        assert_eq!(metadata.file_size, 5);
        assert_eq!(metadata.created_at, created);
        assert_eq!(metadata.modified_at, modified);
        assert!(metadata.extra.is_empty());
    }

    #[test]
    fn test_path_source_is_stated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "twelve bytes").unwrap();

        let metadata = MetadataExtractor::new()
            .extract(
                &DocumentSource::Path(path),
                "txt",
                &ExtractionResult::new("twelve bytes"),
            )
            .unwrap();

        assert_eq!(metadata.file_size, 12);
        assert!(metadata.modified_at <= Utc::now());
    }

    #[test]
    fn test_missing_file_is_metadata_error() {
        let result = MetadataExtractor::new().extract(
            &DocumentSource::Path("/nonexistent/report.pdf".into()),
            "pdf",
            &ExtractionResult::default(),
        );

        match result {
            Err(err @ IngestionError::Metadata { .. }) => {
                assert_eq!(err.stage(), "metadata");
                assert!(err.to_string().contains("/nonexistent/report.pdf"));
            }
            other => panic!("expected metadata error, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let extraction = ExtractionResult::new("")
            .with_metadata("paragraph_count", json!(3))
            .with_metadata("word_count", json!(15));
        let source = DocumentSource::Bytes {
            data: vec![0; 10],
            created_at: Utc::now(),
            modified_at: Utc::now(),
        };

        let metadata = MetadataExtractor::new()
            .extract(&source, "docx", &extraction)
            .unwrap();
        let value = serde_json::to_value(&metadata).unwrap();

        assert_eq!(value["file_type"], "docx");
        assert_eq!(value["file_size"], 10);
        assert_eq!(value["paragraph_count"], 3);
        assert_eq!(value["word_count"], 15);
        assert_eq!(metadata.to_map().len(), 6);
        assert_eq!(metadata.get("word_count"), Some(json!(15)));
    }
}
