//! Generative text service contract.

use async_trait::async_trait;

use crate::Result;

/// Opaque text generation backed by an LLM provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a prose summary of `text`
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Answer `question` using `text` as the only context
    async fn answer_question(&self, text: &str, question: &str) -> Result<String>;

    /// Extract the main points of `text`
    async fn generate_key_points(&self, text: &str) -> Result<Vec<String>>;
}
