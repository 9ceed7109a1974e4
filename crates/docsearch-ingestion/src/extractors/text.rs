use tracing::debug;

use super::{ExtractionResult, TextExtractor};
use crate::{IngestionError, Result};

/// Plain text extractor.
///
/// Content must be valid UTF-8 and is returned verbatim, byte order mark and
/// line endings included.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn file_type(&self) -> &'static str {
        "txt"
    }

    fn extract(&self, content: &[u8], source: &str) -> Result<ExtractionResult> {
        let text = std::str::from_utf8(content)
            .map_err(|e| IngestionError::extraction(source, format!("invalid UTF-8: {}", e)))?;

        debug!(size = content.len(), "Extracted plain text");

        Ok(ExtractionResult::new(text))
    }
}
