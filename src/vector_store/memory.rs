//! In-memory vector store implementation.
//!
//! Useful for testing and local development without a database.

use super::{ChunkRecord, ScoredChunk, SimilarityMetric, VectorStore};
use crate::error::{PaddockError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

struct Inner {
    collection: Option<(usize, SimilarityMetric)>,
    records: Vec<ChunkRecord>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    inner: RwLock<Inner>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                collection: None,
                records: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, dimension: usize, metric: SimilarityMetric) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        match inner.collection {
            None => {
                inner.collection = Some((dimension, metric));
                Ok(())
            }
            // Already exists with the same dimension: success.
            Some((existing, _)) if existing == dimension => Ok(()),
            Some((existing, _)) => Err(PaddockError::VectorStore(format!(
                "Collection already exists with dimension {} (requested {})",
                existing, dimension
            ))),
        }
    }

    async fn insert(&self, record: &ChunkRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let (dimension, _) = inner.collection.ok_or_else(|| {
            PaddockError::VectorStore("Collection has not been created".to_string())
        })?;

        if record.embedding.len() != dimension {
            return Err(PaddockError::VectorStore(format!(
                "Embedding dimension {} does not match collection dimension {}",
                record.embedding.len(),
                dimension
            )));
        }

        inner.records.push(record.clone());
        Ok(())
    }

    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let inner = self.inner.read().unwrap();
        let Some((_, metric)) = inner.collection else {
            return Ok(Vec::new());
        };

        let mut results: Vec<ScoredChunk> = inner
            .records
            .iter()
            .map(|record| ScoredChunk {
                text: record.text.clone(),
                score: metric.score(embedding, &record.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().unwrap().records.len())
    }
}
