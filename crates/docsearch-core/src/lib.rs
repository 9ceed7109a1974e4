//! Core configuration and collaborator contracts for DocSearch.
//!
//! The ingestion core depends only on [`AppConfig`]; the HTTP service wires the
//! collaborator traits ([`VectorStore`], [`DocumentStore`],
//! [`IdentityProvider`], [`TextGenerator`]) to concrete backends. In-memory
//! implementations are provided for development and tests.

pub mod config;
pub mod document_store;
pub mod error;
pub mod generation;
pub mod identity;
pub mod vector_store;

pub use self::config::*;
pub use error::{CoreError, Result};

pub use document_store::{
    DocumentQuery, DocumentRecord, DocumentStore, InMemoryDocumentStore, DEFAULT_LIST_LIMIT,
};
pub use generation::TextGenerator;
pub use identity::{AccessGrant, Identity, IdentityProvider, InMemoryIdentityProvider};
pub use vector_store::{InMemoryVectorStore, SearchHit, SimilarDocument, VectorStore};
