use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub processing: ProcessingSettings,
    pub auth: AuthConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env("DOCSEARCH")
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?.add_source(env_source(prefix));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from file with environment overrides.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(path).required(false))
            .add_source(env_source("DOCSEARCH"));

        let config = builder.build()?;
        config.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.cors_origins", vec!["*"])?
            .set_default("processing.chunk_size", default_chunk_size() as i64)?
            .set_default("processing.chunk_overlap", default_chunk_overlap() as i64)?
            .set_default("processing.allowed_file_types", default_allowed_file_types())?
            .set_default("processing.max_file_size", default_max_file_size() as i64)?
            .set_default("auth.admin_username", default_admin_username())?
            .set_default("auth.admin_password", default_admin_password())?
            .set_default("auth.token_ttl_seconds", default_token_ttl_seconds() as i64)?
            .set_default("search.default_limit", default_search_limit() as i64)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            processing: ProcessingSettings::default(),
            auth: AuthConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("processing.allowed_file_types")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec!["*".to_string()],
        }
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Document processing settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingSettings {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_allowed_file_types")]
    pub allowed_file_types: Vec<String>,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl ProcessingSettings {
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_allowed_file_types(mut self, types: Vec<String>) -> Self {
        self.allowed_file_types = types;
        self
    }

    pub fn with_max_file_size(mut self, max: usize) -> Self {
        self.max_file_size = max;
        self
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            allowed_file_types: default_allowed_file_types(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_allowed_file_types() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()]
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl AuthConfig {
    pub fn new(admin_username: String, admin_password: String) -> Self {
        Self {
            admin_username,
            admin_password,
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }

    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(default_admin_username(), default_admin_password())
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "password".to_string()
}

fn default_token_ttl_seconds() -> u64 {
    60 * 60 * 24 * 8 // 8 days
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    5
}
