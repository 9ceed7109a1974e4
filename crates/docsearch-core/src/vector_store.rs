//! Vector store contract and an in-memory stand-in.
//!
//! Embedding generation and nearest-neighbour search belong to the external
//! vector database. [`InMemoryVectorStore`] ranks chunks by query term
//! overlap so the rest of the system can run without one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::Result;

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document the chunk belongs to
    pub document_id: String,
    /// Position of the chunk within its document
    pub chunk_index: usize,
    /// Similarity score, higher is better
    pub score: f32,
    /// Matching chunk text
    pub snippet: String,
}

/// A document related to another one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDocument {
    pub document_id: String,
    /// Best chunk score against the source document, higher is better
    pub score: f32,
}

/// Storage and similarity search over document chunks
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store (or replace) all chunks of a document
    async fn upsert(&self, document_id: &str, chunks: Vec<String>) -> Result<()>;

    /// Return the `k` chunks most similar to `text`
    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>>;

    /// Remove all chunks of a document, returning how many were removed
    async fn delete(&self, document_id: &str) -> Result<usize>;

    /// Up to `limit` other documents resembling `document_id`.
    ///
    /// The first chunk of the document stands in for the whole document.
    /// Unknown documents have no neighbours.
    async fn similar(&self, document_id: &str, limit: usize) -> Result<Vec<SimilarDocument>>;
}

#[derive(Debug, Clone)]
struct StoredChunk {
    text: String,
    terms: HashSet<String>,
}

/// In-memory vector store for development and testing
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    documents: Arc<RwLock<HashMap<String, Vec<StoredChunk>>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks currently stored
    pub async fn len(&self) -> usize {
        self.documents.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document_id: &str, chunks: Vec<String>) -> Result<()> {
        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .map(|text| StoredChunk {
                terms: terms(&text),
                text,
            })
            .collect();

        debug!(
            document_id = %document_id,
            chunk_count = stored.len(),
            "Chunks upserted"
        );

        self.documents
            .write()
            .await
            .insert(document_id.to_string(), stored);
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query_terms = terms(text);
        if query_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut hits: Vec<SearchHit> = documents
            .iter()
            .flat_map(|(document_id, chunks)| {
                chunks.iter().enumerate().filter_map(|(index, chunk)| {
                    let matched = query_terms.intersection(&chunk.terms).count();
                    if matched == 0 {
                        return None;
                    }
                    Some(SearchHit {
                        document_id: document_id.clone(),
                        chunk_index: index,
                        score: matched as f32 / query_terms.len() as f32,
                        snippet: chunk.text.clone(),
                    })
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document_id.cmp(&b.document_id))
                .then_with(|| a.chunk_index.cmp(&b.chunk_index))
        });
        hits.truncate(k);

        Ok(hits)
    }

    async fn similar(&self, document_id: &str, limit: usize) -> Result<Vec<SimilarDocument>> {
        let probe = {
            let documents = self.documents.read().await;
            match documents.get(document_id).and_then(|chunks| chunks.first()) {
                Some(chunk) => chunk.text.clone(),
                None => return Ok(Vec::new()),
            }
        };

        let mut seen = HashSet::new();
        let similar: Vec<SimilarDocument> = self
            .query(&probe, usize::MAX)
            .await?
            .into_iter()
            .filter(|hit| hit.document_id != document_id)
            .filter(|hit| seen.insert(hit.document_id.clone()))
            .take(limit)
            .map(|hit| SimilarDocument {
                document_id: hit.document_id,
                score: hit.score,
            })
            .collect();

        debug!(
            document_id = %document_id,
            similar_count = similar.len(),
            "Similar documents resolved"
        );

        Ok(similar)
    }

    async fn delete(&self, document_id: &str) -> Result<usize> {
        let removed = self
            .documents
            .write()
            .await
            .remove(document_id)
            .map(|chunks| chunks.len())
            .unwrap_or(0);
        Ok(removed)
    }
}
