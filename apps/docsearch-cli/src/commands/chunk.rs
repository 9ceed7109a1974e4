//! Text chunking command

use anyhow::{Context, Result};
use docsearch_core::AppConfig;
use docsearch_ingestion::{ChunkingConfig, TextChunker};
use std::io::Read;
use tracing::debug;

use crate::output::{self, OutputFormat};

pub fn run(
    config: &AppConfig,
    input: &str,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let chunking = ChunkingConfig {
        chunk_size: chunk_size.unwrap_or(config.processing.chunk_size),
        chunk_overlap: chunk_overlap.unwrap_or(config.processing.chunk_overlap),
    };
    let chunker = TextChunker::new(chunking).context("Invalid chunking options")?;

    let text = read_input(input)?;
    let chunks = chunker.chunk(&text);
    debug!(
        input = %input,
        characters = text.chars().count(),
        chunk_count = chunks.len(),
        "Chunked input"
    );

    match format {
        OutputFormat::Json => output::print_json(&chunks)?,
        OutputFormat::Text => {
            for chunk in &chunks {
                output::dimmed(&format!(
                    "--- chunk {} [{}..{}] ---",
                    chunk.index, chunk.start_offset, chunk.end_offset
                ));
                println!("{}", chunk.content);
            }
        }
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
