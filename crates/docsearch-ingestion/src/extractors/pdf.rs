use lopdf::{Dictionary, Document, Object};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{ExtractionResult, TextExtractor};
use crate::{IngestionError, Result};

/// PDF extractor.
///
/// Pages are read in page-number order; each page's text is followed by a
/// newline, including the last one. Records `page_count` and `pdf_info` (the
/// trailer's document information dictionary, empty when absent).
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn file_type(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, content: &[u8], source: &str) -> Result<ExtractionResult> {
        let document =
            Document::load_mem(content).map_err(|e| IngestionError::extraction(source, e))?;

        let pages = document.get_pages();
        let mut text = String::new();

        for &page_number in pages.keys() {
            let page_text = document.extract_text(&[page_number]).map_err(|e| {
                IngestionError::extraction(source, format!("page {}: {}", page_number, e))
            })?;
            text.push_str(page_text.trim_end_matches(|c: char| c == '\n' || c == '\r'));
            text.push('\n');
        }

        let info = document_info(&document);

        debug!(
            page_count = pages.len(),
            info_entries = info.len(),
            "Extracted PDF text"
        );

        Ok(ExtractionResult::new(text)
            .with_metadata("page_count", json!(pages.len()))
            .with_metadata("pdf_info", Value::Object(info)))
    }
}

/// Entries of the trailer `/Info` dictionary, keyed without the leading slash
fn document_info(document: &Document) -> Map<String, Value> {
    let dictionary = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => document.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dictionary)) => Some(dictionary),
        _ => None,
    };

    dictionary.map(info_entries).unwrap_or_default()
}

fn info_entries(dictionary: &Dictionary) -> Map<String, Value> {
    dictionary
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Object::String(bytes, _) => Value::String(decode_text_string(bytes)),
                Object::Name(name) => Value::String(String::from_utf8_lossy(name).into_owned()),
                Object::Integer(n) => json!(n),
                Object::Real(r) => json!(f64::from(*r)),
                Object::Boolean(b) => Value::Bool(*b),
                _ => return None,
            };
            Some((String::from_utf8_lossy(key).into_owned(), value))
        })
        .collect()
}

/// Decode a PDF text string: UTF-16BE or UTF-8 when marked, PDFDocEncoding
/// (treated as Latin-1) otherwise
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
