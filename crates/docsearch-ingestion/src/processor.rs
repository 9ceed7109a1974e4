//! Document Processor
//!
//! Single entry point of the ingestion pipeline: validates a raw document,
//! extracts its text, chunks it and gathers its metadata.

use chrono::{DateTime, Utc};
use docsearch_core::ProcessingSettings;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chunking::{Chunk, ChunkingConfig, TextChunker};
use crate::extractors::ExtractorRegistry;
use crate::metadata::{DocumentMetadata, MetadataExtractor};
use crate::{IngestionError, Result};

/// Where the bytes of a document come from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A file on disk; size and timestamps come from the file system
    Path(PathBuf),
    /// An in-memory buffer with caller-supplied timestamps
    Bytes {
        data: Vec<u8>,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    },
}

impl DocumentSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// In-memory source stamped with the current time
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        let now = Utc::now();
        Self::Bytes {
            data: data.into(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// A document to be processed
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Human-readable title
    pub title: String,
    /// Declared file-type tag (`pdf`, `docx`, `txt`)
    pub file_type: String,
    pub source: DocumentSource,
}

impl RawDocument {
    pub fn new(title: impl Into<String>, file_type: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            title: title.into(),
            file_type: file_type.into(),
            source,
        }
    }

    /// Document backed by a file, titled after its file name
    pub fn from_path(path: impl AsRef<Path>, file_type: impl Into<String>) -> Self {
        let path = path.as_ref();
        let title = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("untitled")
            .to_string();
        Self::new(title, file_type, DocumentSource::path(path))
    }

    pub fn from_bytes(
        title: impl Into<String>,
        file_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(title, file_type, DocumentSource::bytes(data))
    }
}

/// Output of a successful [`DocumentProcessor::process`] call
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// Full extracted text
    pub text: String,
    /// Ordered chunks of `text`
    pub chunks: Vec<Chunk>,
    pub metadata: DocumentMetadata,
}

impl ProcessingResult {
    pub fn chunk_contents(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.content.clone()).collect()
    }
}

/// Processor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    pub chunking: ChunkingConfig,
    /// Accepted filename extensions, lowercase
    pub allowed_file_types: Vec<String>,
    /// Maximum input size in bytes
    pub max_file_size: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::from(&ProcessingSettings::default())
    }
}

impl From<&ProcessingSettings> for ProcessorConfig {
    fn from(settings: &ProcessingSettings) -> Self {
        Self {
            chunking: ChunkingConfig {
                chunk_size: settings.chunk_size,
                chunk_overlap: settings.chunk_overlap,
            },
            allowed_file_types: settings
                .allowed_file_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
            max_file_size: settings.max_file_size,
        }
    }
}

impl ProcessorConfig {
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_allowed_file_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_file_types = types
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_max_file_size(mut self, max: usize) -> Self {
        self.max_file_size = max;
        self
    }
}

/// Document processor
///
/// Holds no mutable state, so one instance can serve concurrent callers.
pub struct DocumentProcessor {
    config: ProcessorConfig,
    registry: ExtractorRegistry,
    chunker: TextChunker,
    metadata: MetadataExtractor,
}

impl DocumentProcessor {
    /// Create a processor with the default PDF, DOCX and TXT extractors
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Self::with_registry(config, ExtractorRegistry::with_defaults())
    }

    pub fn with_registry(config: ProcessorConfig, registry: ExtractorRegistry) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking)?;
        Ok(Self {
            config,
            registry,
            chunker,
            metadata: MetadataExtractor::new(),
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Process a document into text, chunks and metadata.
    ///
    /// Any stage failure aborts the whole call; no partial result is returned.
    pub fn process(&self, document: &RawDocument) -> Result<ProcessingResult> {
        // Names the input in error messages
        let input = match &document.source {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Bytes { .. } => document.title.clone(),
        };
        let extractor = self.registry.get(&document.file_type)?;

        let content: Cow<'_, [u8]> = match &document.source {
            DocumentSource::Path(path) => {
                // Oversized files are rejected before their contents are read
                let len = std::fs::metadata(path)
                    .map_err(|e| IngestionError::extraction(&input, e))?
                    .len();
                self.check_size(&document.title, usize::try_from(len).unwrap_or(usize::MAX))?;
                Cow::Owned(std::fs::read(path).map_err(|e| IngestionError::extraction(&input, e))?)
            }
            DocumentSource::Bytes { data, .. } => Cow::Borrowed(data),
        };
        self.check_size(&document.title, content.len())?;

        let extraction = extractor.extract(&content, &input)?;
        debug!(
            title = %document.title,
            extractor = %extractor.file_type(),
            text_len = extraction.text.len(),
            "Text extracted"
        );

        let chunks = self.chunker.chunk(&extraction.text);
        let metadata = self
            .metadata
            .extract(&document.source, &document.file_type, &extraction)?;

        info!(
            title = %document.title,
            file_type = %metadata.file_type,
            file_size = metadata.file_size,
            chunk_count = chunks.len(),
            "Document processed"
        );

        Ok(ProcessingResult {
            text: extraction.text,
            chunks,
            metadata,
        })
    }

    fn check_size(&self, title: &str, size: usize) -> Result<()> {
        if size > self.config.max_file_size {
            warn!(
                title = %title,
                size = size,
                max = self.config.max_file_size,
                "Document exceeds size limit"
            );
            return Err(IngestionError::DocumentTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        Ok(())
    }

    /// Run [`process`](Self::process) on the blocking thread pool
    pub async fn process_async(self: Arc<Self>, document: RawDocument) -> Result<ProcessingResult> {
        tokio::task::spawn_blocking(move || self.process(&document))
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))?
    }

    /// Check a filename's extension against the configured allow-list
    pub fn validate_file_type(&self, filename: &str) -> bool {
        validate_file_type(filename, &self.config.allowed_file_types)
    }
}

/// Check a filename's extension (text after the last `.`, compared
/// case-insensitively) against `allowed`. Names without a `.` are rejected.
pub fn validate_file_type(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => allowed
            .iter()
            .any(|t| t.eq_ignore_ascii_case(extension)),
        _ => false,
    }
}
