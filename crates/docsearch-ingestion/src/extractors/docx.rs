use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use serde_json::json;
use tracing::debug;

use super::{ExtractionResult, TextExtractor};
use crate::{IngestionError, Result};

/// DOCX extractor.
///
/// Body-level paragraphs are joined with a single newline. Records
/// `paragraph_count` and `word_count` (whitespace-separated tokens across all
/// paragraphs).
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxExtractor {
    fn file_type(&self) -> &'static str {
        "docx"
    }

    fn extract(&self, content: &[u8], source: &str) -> Result<ExtractionResult> {
        let docx = docx_rs::read_docx(content).map_err(|e| IngestionError::extraction(source, e))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => {
                    let mut text = String::new();
                    collect_text(&paragraph.children, &mut text);
                    Some(text)
                }
                _ => None,
            })
            .collect();

        let word_count: usize = paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum();

        debug!(
            paragraph_count = paragraphs.len(),
            word_count = word_count,
            "Extracted DOCX text"
        );

        Ok(ExtractionResult::new(paragraphs.join("\n"))
            .with_metadata("paragraph_count", json!(paragraphs.len()))
            .with_metadata("word_count", json!(word_count)))
    }
}

fn collect_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => out.push_str(&text.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, out),
            _ => {}
        }
    }
}
