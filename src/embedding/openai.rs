//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{PaddockError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new embedder with custom model and dimensions.
    ///
    /// The dimension must match the vector collection the embeddings are
    /// stored in; it is held constant for the lifetime of a collection.
    pub fn with_config(model: &str, dimensions: usize) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(PaddockError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| PaddockError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| PaddockError::OpenAI(format!("Embedding API error: {}", e)))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| PaddockError::Embedding("Empty embedding response".to_string()))?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_reports_configured_dimensions() {
        let embedder = OpenAIEmbedder::with_config("text-embedding-3-small", 768);
        assert_eq!(embedder.dimensions(), 768);
    }

    #[tokio::test]
    async fn rejects_empty_text() {
        let embedder = OpenAIEmbedder::with_config("text-embedding-3-small", 768);
        let result = embedder.embed("").await;
        assert!(matches!(result, Err(PaddockError::InvalidInput(_))));
    }
}
