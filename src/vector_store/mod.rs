//! Vector store abstraction for Paddock.
//!
//! Provides a trait-based interface over the vector collection that holds
//! embedded page chunks: an in-memory store, a local SQLite store, and a
//! hosted JSON Document-API store.

mod data_api;
mod memory;
mod sqlite;

pub use data_api::DataApiStore;
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk stored in the vector collection.
///
/// Invariant: `embedding` is the embedding of `text`, and its dimension is
/// constant across all records in one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Page the chunk was scraped from.
    pub source_url: Option<String>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Create a new record.
    pub fn new(text: String, embedding: Vec<f32>, source_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            embedding,
            source_url,
            indexed_at: Utc::now(),
        }
    }
}

/// A retrieved chunk with its similarity score (higher is better).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Text content of the matched chunk.
    pub text: String,
    /// Similarity score under the collection's metric.
    pub score: f32,
}

/// Similarity metric used to rank stored vectors against a query vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Inner product; assumes normalized embeddings.
    DotProduct,
    /// Angle-based similarity, magnitude-invariant.
    Cosine,
    /// Straight-line distance; smaller is more similar.
    Euclidean,
}

impl SimilarityMetric {
    /// Score two vectors so that a larger score always means more similar.
    ///
    /// Euclidean distance is negated so all metrics sort descending.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            SimilarityMetric::DotProduct => dot_product(a, b),
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::Euclidean => -euclidean_distance(a, b),
        }
    }
}

impl std::str::FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot_product" | "dot" => Ok(SimilarityMetric::DotProduct),
            "cosine" => Ok(SimilarityMetric::Cosine),
            "euclidean" => Ok(SimilarityMetric::Euclidean),
            _ => Err(format!("Unknown similarity metric: {}", s)),
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::DotProduct => write!(f, "dot_product"),
            SimilarityMetric::Cosine => write!(f, "cosine"),
            SimilarityMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the vector collection.
    ///
    /// Idempotent: an already-existing collection with the same dimension is
    /// success, not an error. An existing collection with a different
    /// dimension is an error (the dimension invariant would break).
    async fn create_collection(&self, dimension: usize, metric: SimilarityMetric) -> Result<()>;

    /// Append one chunk record. No uniqueness constraint beyond the ID.
    async fn insert(&self, record: &ChunkRecord) -> Result<()>;

    /// Retrieve up to `limit` chunks, most-similar first.
    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Get total record count.
    async fn count(&self) -> Result<usize>;
}

/// Open the vector store named by the configuration.
pub fn open_store(
    settings: &crate::config::Settings,
) -> Result<std::sync::Arc<dyn VectorStore>> {
    use crate::config::StoreProvider;
    use crate::error::PaddockError;

    let vs = &settings.vector_store;
    match vs.provider {
        StoreProvider::Memory => Ok(std::sync::Arc::new(MemoryVectorStore::new())),
        StoreProvider::Sqlite => Ok(std::sync::Arc::new(SqliteVectorStore::new(
            &settings.sqlite_path(),
            &vs.collection,
        )?)),
        StoreProvider::DataApi => {
            let endpoint = vs.api_endpoint.as_deref().ok_or_else(|| {
                PaddockError::Config("vector_store.api_endpoint is not set".to_string())
            })?;
            let namespace = vs.namespace.as_deref().ok_or_else(|| {
                PaddockError::Config("vector_store.namespace is not set".to_string())
            })?;
            let token = vs.application_token.as_deref().ok_or_else(|| {
                PaddockError::Config("vector_store.application_token is not set".to_string())
            })?;
            Ok(std::sync::Arc::new(DataApiStore::new(
                endpoint,
                namespace,
                &vs.collection,
                token,
            )))
        }
    }
}

/// Compute the dot product of two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = dot_product(a, b);
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Compute Euclidean distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
