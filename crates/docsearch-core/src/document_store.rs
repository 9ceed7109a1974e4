//! Document metadata persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{CoreError, Result};

/// Persisted record for an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique document identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Original upload filename
    pub filename: String,
    /// Declared file type tag
    pub file_type: String,
    /// User who uploaded the document
    pub owner: String,
    /// Tags assigned to the document
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of chunks sent to the vector store
    pub chunk_count: usize,
    /// Extracted plain text, used for summaries and Q&A
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Metadata produced by the ingestion pipeline
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        filename: impl Into<String>,
        file_type: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            filename: filename.into(),
            file_type: file_type.into(),
            owner: owner.into(),
            tags: Vec::new(),
            chunk_count: 0,
            text: String::new(),
            metadata: BTreeMap::new(),
            uploaded_at: Utc::now(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_chunk_count(mut self, count: usize) -> Self {
        self.chunk_count = count;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Documents returned by a listing when no limit is given
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Filter for listing documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    /// Only documents uploaded by this user
    pub owner: Option<String>,
    /// Only documents carrying this tag
    pub tag: Option<String>,
    /// Maximum number of records returned
    pub limit: usize,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            owner: None,
            tag: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        self.owner.as_deref().map_or(true, |owner| record.owner == owner)
            && self.tag.as_deref().map_or(true, |tag| record.has_tag(tag))
    }
}

/// Key-value store for document records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, record: DocumentRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>>;

    /// Returns `true` if a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// All records, newest upload first
    async fn list(&self) -> Result<Vec<DocumentRecord>>;

    /// Replace the tags of a document
    async fn set_tags(&self, id: &str, tags: Vec<String>) -> Result<DocumentRecord>;

    /// Records matching `query`, newest upload first, at most `query.limit`
    async fn find(&self, query: &DocumentQuery) -> Result<Vec<DocumentRecord>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|record| query.matches(record))
            .take(query.limit)
            .collect())
    }
}

/// In-memory document store for development and testing
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<HashMap<String, DocumentRecord>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, record: DocumentRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>> {
        let mut records: Vec<DocumentRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn set_tags(&self, id: &str, tags: Vec<String>) -> Result<DocumentRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let mut tags = tags;
        tags.sort();
        tags.dedup();
        record.tags = tags;

        Ok(record.clone())
    }
}
