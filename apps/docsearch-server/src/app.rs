//! Application state and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use docsearch_core::{
    AppConfig, DocumentStore, IdentityProvider, InMemoryDocumentStore, InMemoryIdentityProvider,
    InMemoryVectorStore, TextGenerator, VectorStore,
};
use docsearch_ingestion::{DocumentProcessor, ProcessorConfig};

use crate::cli::Args;
use crate::server::Server;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Ingestion pipeline, shared by concurrent uploads
    pub processor: Arc<DocumentProcessor>,
    pub documents: Arc<dyn DocumentStore>,
    pub vectors: Arc<dyn VectorStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Summaries and Q&A; `None` answers those routes with 503
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// Create the state with in-memory collaborators
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing application components");

        let processor = DocumentProcessor::new(ProcessorConfig::from(&config.processing))
            .context("Invalid processing configuration")?;
        let identity = InMemoryIdentityProvider::from_config(&config.auth)
            .await
            .context("Failed to seed the administrator account")?;

        info!(
            chunk_size = config.processing.chunk_size,
            chunk_overlap = config.processing.chunk_overlap,
            allowed_file_types = ?config.processing.allowed_file_types,
            "Document processor ready"
        );

        Ok(Self {
            config: Arc::new(config),
            processor: Arc::new(processor),
            documents: Arc::new(InMemoryDocumentStore::new()),
            vectors: Arc::new(InMemoryVectorStore::new()),
            identity: Arc::new(identity),
            generator: None,
        })
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

/// Main application
pub struct App {
    args: Args,
    state: AppState,
}

impl App {
    /// Load configuration and build the application state
    pub async fn build(args: Args) -> Result<Self> {
        let config_path = args.config.to_string_lossy().into_owned();
        let mut config = AppConfig::load_from_file(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?;

        if let Some(port) = args.port {
            config.server.port = port;
        }

        let state = AppState::new(config).await?;

        Ok(Self { args, state })
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting server");
        info!("Log level: {}", self.args.log_level);

        let server = Server::new(self.state);
        server.run().await
    }
}
