//! Embedding generation for semantic retrieval.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Callers are responsible for sizing: text must be non-empty and within the
/// model's token limit (the chunker keeps ingestion inputs bounded).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
