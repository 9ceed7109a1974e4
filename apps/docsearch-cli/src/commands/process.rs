//! Document processing command

use anyhow::{Context, Result};
use docsearch_core::AppConfig;
use docsearch_ingestion::{DocumentProcessor, ProcessingResult, ProcessorConfig, RawDocument};
use std::path::Path;
use tracing::debug;

use crate::output::{self, OutputFormat};

const PREVIEW_CHARS: usize = 72;

pub fn run(
    config: &AppConfig,
    path: &Path,
    file_type: Option<&str>,
    show_chunks: bool,
    format: OutputFormat,
) -> Result<()> {
    let file_type = match file_type {
        Some(tag) => tag.to_string(),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .with_context(|| {
                format!("Cannot infer file type of {}; pass --type", path.display())
            })?,
    };

    debug!(path = %path.display(), file_type = %file_type, "Processing document");

    let processor = DocumentProcessor::new(ProcessorConfig::from(&config.processing))
        .context("Invalid processing configuration")?;
    let result = processor
        .process(&RawDocument::from_path(path, file_type))
        .with_context(|| format!("Failed to process {}", path.display()))?;

    match format {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Text => print_text(path, &result, show_chunks),
    }

    Ok(())
}

fn print_text(path: &Path, result: &ProcessingResult, show_chunks: bool) {
    let metadata = &result.metadata;

    output::section(&path.display().to_string());
    output::key_value("Type", &metadata.file_type);
    output::key_value("Size", &output::format_size(metadata.file_size));
    output::key_value("Created", &metadata.created_at.to_rfc3339());
    output::key_value("Modified", &metadata.modified_at.to_rfc3339());
    for (key, value) in &metadata.extra {
        output::key_value(key, &value.to_string());
    }
    output::key_value("Characters", &result.text.chars().count().to_string());
    output::key_value("Chunks", &result.chunks.len().to_string());

    if result.chunks.is_empty() {
        output::dimmed("No text extracted");
        return;
    }

    output::section("Chunks");
    for chunk in &result.chunks {
        output::dimmed(&format!(
            "[{}] {}..{} ({} chars)",
            chunk.index,
            chunk.start_offset,
            chunk.end_offset,
            chunk.char_count()
        ));
        if show_chunks {
            println!("{}", chunk.content);
        } else {
            println!("  {}", output::truncate(&chunk.content.replace('\n', " "), PREVIEW_CHARS));
        }
    }
}
