//! Document Ingestion Pipeline for DocSearch
//!
//! Turns uploaded PDF, DOCX and plain-text files into the artifacts the
//! search service persists: the full extracted text, an ordered list of
//! overlapping chunks ready for embedding, and a metadata map.
//!
//! # Features
//!
//! - Format extractors selected through a registry keyed by file-type tag
//! - Deterministic fixed-size chunking with sentence-boundary snapping
//! - File-system and format-specific metadata extraction
//! - Filename validation against a configurable allow-list

pub mod chunking;
pub mod extractors;
pub mod metadata;
pub mod processor;

// Re-exports
pub use chunking::{Chunk, ChunkingConfig, TextChunker};
pub use extractors::{
    DocxExtractor, ExtractionResult, ExtractorRegistry, PdfExtractor, PlainTextExtractor,
    TextExtractor,
};
pub use metadata::{DocumentMetadata, MetadataExtractor};
pub use processor::{
    validate_file_type, DocumentProcessor, DocumentSource, ProcessingResult, ProcessorConfig,
    RawDocument,
};

/// Error types for ingestion operations
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Extraction failed for {input}: {reason}")]
    Extraction { input: String, reason: String },

    #[error("Metadata extraction failed for {input}: {source}")]
    Metadata {
        input: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document too large: {size} bytes (max {max})")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Processing task failed: {0}")]
    Task(String),
}

impl IngestionError {
    pub(crate) fn extraction(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Pipeline stage the error originated from
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) | Self::Extraction { .. } => "extraction",
            Self::Metadata { .. } => "metadata",
            Self::DocumentTooLarge { .. } | Self::Validation(_) => "validation",
            Self::Task(_) => "task",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestionError>;
