//! SQLite-based vector store implementation.
//!
//! Uses SQLite with similarity computed in Rust for simplicity. For large
//! collections, consider the sqlite-vec extension or a hosted vector
//! database (see [`super::DataApiStore`]).

use super::{ChunkRecord, ScoredChunk, SimilarityMetric, VectorStore};
use crate::error::{PaddockError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collection_meta (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        name TEXT NOT NULL,
        dimension INTEGER NOT NULL,
        metric TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        source_url TEXT,
        indexed_at TEXT NOT NULL
    );
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store backed by a file.
    #[instrument(skip_all)]
    pub fn new(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Serialize embedding to little-endian bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PaddockError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn meta(conn: &Connection) -> Result<Option<(usize, SimilarityMetric)>> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT dimension, metric FROM collection_meta WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((dimension, metric)) => {
                let metric = SimilarityMetric::from_str(&metric)
                    .map_err(PaddockError::VectorStore)?;
                Ok(Some((dimension as usize, metric)))
            }
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, dimension: usize, metric: SimilarityMetric) -> Result<()> {
        let conn = self.lock()?;

        match Self::meta(&conn)? {
            None => {
                conn.execute(
                    "INSERT INTO collection_meta (id, name, dimension, metric) VALUES (1, ?1, ?2, ?3)",
                    params![self.collection, dimension as i64, metric.to_string()],
                )?;
                info!(
                    "Created collection '{}' (dimension {}, metric {})",
                    self.collection, dimension, metric
                );
                Ok(())
            }
            Some((existing, _)) if existing == dimension => {
                debug!("Collection '{}' already exists, skipping", self.collection);
                Ok(())
            }
            Some((existing, _)) => Err(PaddockError::VectorStore(format!(
                "Collection already exists with dimension {} (requested {})",
                existing, dimension
            ))),
        }
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, record: &ChunkRecord) -> Result<()> {
        let conn = self.lock()?;

        let (dimension, _) = Self::meta(&conn)?.ok_or_else(|| {
            PaddockError::VectorStore("Collection has not been created".to_string())
        })?;

        if record.embedding.len() != dimension {
            return Err(PaddockError::VectorStore(format!(
                "Embedding dimension {} does not match collection dimension {}",
                record.embedding.len(),
                dimension
            )));
        }

        conn.execute(
            "INSERT INTO chunks (id, text, embedding, source_url, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.text,
                Self::embedding_to_bytes(&record.embedding),
                record.source_url,
                record.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted chunk {}", record.id);
        Ok(())
    }

    #[instrument(skip(self, embedding))]
    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let conn = self.lock()?;

        let Some((_, metric)) = Self::meta(&conn)? else {
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare(
            "SELECT id, text, embedding, source_url, indexed_at FROM chunks",
        )?;

        let records = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(2)?;
            let indexed_at_str: String = row.get(4)?;

            Ok(ChunkRecord {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                text: row.get(1)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                source_url: row.get(3)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut results: Vec<ScoredChunk> = records
            .filter_map(|record| record.ok())
            .map(|record| ScoredChunk {
                score: metric.score(embedding, &record.embedding),
                text: record.text,
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
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord::new(text.to_string(), embedding, Some("https://example.com".into()))
    }

    #[tokio::test]
    async fn roundtrips_records_through_sqlite() {
        let store = SqliteVectorStore::in_memory("f1gpt").unwrap();
        store
            .create_collection(3, SimilarityMetric::DotProduct)
            .await
            .unwrap();

        store
            .insert(&record("Verstappen venceu", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        store
            .insert(&record("Norris em segundo", vec![0.0, 1.0, 0.0]))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);

        let results = store.query(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Verstappen venceu");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let store = SqliteVectorStore::in_memory("f1gpt").unwrap();
        store
            .create_collection(768, SimilarityMetric::DotProduct)
            .await
            .unwrap();
        store
            .create_collection(768, SimilarityMetric::DotProduct)
            .await
            .unwrap();
        assert!(store
            .create_collection(1536, SimilarityMetric::DotProduct)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn query_honors_limit() {
        let store = SqliteVectorStore::in_memory("f1gpt").unwrap();
        store
            .create_collection(2, SimilarityMetric::Cosine)
            .await
            .unwrap();

        for i in 0..20 {
            store
                .insert(&record(&format!("chunk {}", i), vec![1.0, i as f32]))
                .await
                .unwrap();
        }

        let results = store.query(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path, "f1gpt").unwrap();
            store
                .create_collection(2, SimilarityMetric::Cosine)
                .await
                .unwrap();
            store.insert(&record("persisted", vec![1.0, 0.0])).await.unwrap();
        }

        let reopened = SqliteVectorStore::new(&path, "f1gpt").unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        let results = reopened.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results[0].text, "persisted");
    }
}
