//! Document Text Extractors
//!
//! One extractor per supported file format, each turning raw bytes into
//! plain text plus the format-specific metadata it can see while parsing.
//! [`ExtractorRegistry`] is the dispatch table keyed by file-type tag.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{IngestionError, Result};

mod docx;
mod pdf;
mod text;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

/// Result of text extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text content
    pub text: String,
    /// Format-specific metadata (page counts, word counts, ...)
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ExtractionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Trait for document text extractors
pub trait TextExtractor: Send + Sync {
    /// File-type tag this extractor handles, lowercase
    fn file_type(&self) -> &'static str;

    /// Extract text from document content.
    ///
    /// `source` names the input in error messages.
    fn extract(&self, content: &[u8], source: &str) -> Result<ExtractionResult>;
}

/// Registry of text extractors keyed by file-type tag
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with the PDF, DOCX and plain-text extractors
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PlainTextExtractor::new()));
        registry
    }

    /// Register an extractor, replacing any previous one for the same tag
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        self.extractors
            .insert(extractor.file_type().to_string(), extractor);
    }

    /// Get the extractor for a declared file-type tag
    pub fn get(&self, file_type: &str) -> Result<Arc<dyn TextExtractor>> {
        self.extractors
            .get(&file_type.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| IngestionError::UnsupportedFileType(file_type.to_string()))
    }

    pub fn supports(&self, file_type: &str) -> bool {
        self.extractors
            .contains_key(&file_type.to_ascii_lowercase())
    }

    /// List registered file-type tags
    pub fn list(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
