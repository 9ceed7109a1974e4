//! Text Chunking Module
//!
//! Splits extracted text into overlapping, fixed-size windows for embedding.
//! Windows that are not the last one are shortened to end just after the
//! final period they contain, so chunks tend to finish on a sentence.
//!
//! All sizes and offsets are counted in characters, never bytes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IngestionError, Result};

/// A chunk of text from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of the chunk in the document, starting at 0
    pub index: usize,
    /// Chunk text with surrounding whitespace trimmed
    pub content: String,
    /// Character offset of the first character of `content`
    pub start_offset: usize,
    /// Character offset one past the last character of `content`
    pub end_offset: usize,
}

impl Chunk {
    pub fn char_count(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// Configuration for text chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive windows
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(IngestionError::Validation(
                "Chunk size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(IngestionError::Validation(
                "Chunk overlap must be less than chunk size".to_string(),
            ));
        }
        Ok(())
    }
}

/// Text chunker for splitting documents
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk a document's text.
    ///
    /// Empty or whitespace-only input yields no chunks. The output depends
    /// only on `text` and the configuration.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let ChunkingConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let mut end = start + chunk_size;

            if end < total {
                if let Some(period) = chars[start..end].iter().rposition(|&c| c == '.') {
                    end = start + period + 1;
                }
            }

            let window_end = end.min(total);
            if let Some(chunk) = trimmed_chunk(&chars, start, window_end, chunks.len()) {
                chunks.push(chunk);
            }

            // Stepping back by the overlap leaves at most `chunk_overlap`
            // characters exactly when this window reached the end of the text.
            if window_end == total {
                break;
            }

            let next = end.saturating_sub(chunk_overlap);
            start = if next > start { next } else { end };
        }

        debug!(
            text_len = total,
            chunk_count = chunks.len(),
            "Text chunked"
        );

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

fn trimmed_chunk(chars: &[char], start: usize, end: usize, index: usize) -> Option<Chunk> {
    let window = &chars[start..end];
    let leading = window.iter().take_while(|c| c.is_whitespace()).count();
    if leading == window.len() {
        return None;
    }
    let trailing = window.iter().rev().take_while(|c| c.is_whitespace()).count();

    let start_offset = start + leading;
    let end_offset = end - trailing;

    Some(Chunk {
        index,
        content: chars[start_offset..end_offset].iter().collect(),
        start_offset,
        end_offset,
    })
}
