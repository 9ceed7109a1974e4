//! CLI command implementations

pub mod chunk;
pub mod process;
pub mod validate;

use anyhow::{Context, Result};
use docsearch_core::AppConfig;
use std::path::Path;

/// Load settings from `path` when given, otherwise from defaults and the
/// environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let path = path.to_string_lossy();
            AppConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path))
        }
        None => AppConfig::load().context("Failed to load configuration"),
    }
}
