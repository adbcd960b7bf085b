//! Hosted vector store client speaking the JSON Document API dialect.
//!
//! The hosted database exposes a single JSON-over-HTTP endpoint per keyspace
//! that accepts commands (`createCollection`, `insertOne`, `find`,
//! `countDocuments`), authenticated by an application token. Vector search
//! is expressed as a `find` sorted by `$vector`.

use super::{ChunkRecord, ScoredChunk, SimilarityMetric, VectorStore};
use crate::error::{PaddockError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

/// Client for a hosted document database with vector search support.
pub struct DataApiStore {
    client: reqwest::Client,
    endpoint: String,
    namespace: String,
    collection: String,
    token: String,
}

/// Shape of a stored document as returned by `find`.
///
/// Validated at this boundary: a document without `text` is rejected rather
/// than surfaced as a half-formed record.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    text: String,
    #[serde(rename = "$similarity")]
    similarity: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Option<ApiData>,
    status: Option<serde_json::Value>,
    errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    documents: Option<Vec<serde_json::Value>>,
}

impl DataApiStore {
    /// Create a new client for the given endpoint, keyspace, and collection.
    pub fn new(endpoint: &str, namespace: &str, collection: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            collection: collection.to_string(),
            token: token.to_string(),
        }
    }

    fn keyspace_url(&self) -> String {
        format!("{}/api/json/v1/{}", self.endpoint, self.namespace)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.keyspace_url(), self.collection)
    }

    async fn command(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let response = self
            .client
            .post(url)
            .header("Token", &self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaddockError::VectorStore(format!(
                "Data API returned {}: {}",
                status, text
            )));
        }

        Ok(response.json::<ApiResponse>().await?)
    }

    fn check_errors(response: &ApiResponse, context: &str) -> Result<()> {
        if let Some(errors) = &response.errors {
            if let Some(first) = errors.first() {
                let message = first.message.clone().unwrap_or_default();
                let code = first.error_code.clone().unwrap_or_default();
                return Err(PaddockError::VectorStore(format!(
                    "{}: {} {}",
                    context, code, message
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for DataApiStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, dimension: usize, metric: SimilarityMetric) -> Result<()> {
        let body = json!({
            "createCollection": {
                "name": self.collection,
                "options": {
                    "vector": {
                        "dimension": dimension,
                        "metric": metric.to_string(),
                    }
                }
            }
        });

        let response = self.command(&self.keyspace_url(), body).await?;

        if let Some(errors) = &response.errors {
            // A collection that exists with different settings (dimension or
            // metric) is a configuration error, never silent success.
            let conflict = errors.iter().any(|e| {
                e.error_code.as_deref() == Some("EXISTING_COLLECTION_DIFFERENT_SETTINGS")
                    || e.message
                        .as_deref()
                        .is_some_and(|m| m.contains("different settings"))
            });
            if conflict {
                return Err(PaddockError::VectorStore(format!(
                    "Collection '{}' already exists with different settings \
                     (requested dimension {}, metric {})",
                    self.collection, dimension, metric
                )));
            }

            // A plain "already exists" is success, not an error.
            let already_exists = errors.iter().any(|e| {
                e.message
                    .as_deref()
                    .is_some_and(|m| m.contains("already exists"))
            });
            if already_exists {
                debug!("Collection '{}' already exists, skipping", self.collection);
                return Ok(());
            }
        }

        Self::check_errors(&response, "createCollection failed")?;
        debug!(
            "Created collection '{}' (dimension {}, metric {})",
            self.collection, dimension, metric
        );
        Ok(())
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, record: &ChunkRecord) -> Result<()> {
        let body = json!({
            "insertOne": {
                "document": {
                    "_id": record.id.to_string(),
                    "$vector": record.embedding,
                    "text": record.text,
                    "source_url": record.source_url,
                    "indexed_at": record.indexed_at.to_rfc3339(),
                }
            }
        });

        let response = self.command(&self.collection_url(), body).await?;
        Self::check_errors(&response, "insertOne failed")?;

        debug!("Inserted chunk {}", record.id);
        Ok(())
    }

    #[instrument(skip(self, embedding))]
    async fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let body = json!({
            "find": {
                "sort": { "$vector": embedding },
                "options": {
                    "limit": limit,
                    "includeSimilarity": true,
                }
            }
        });

        let response = self.command(&self.collection_url(), body).await?;
        Self::check_errors(&response, "find failed")?;

        let documents = response
            .data
            .and_then(|d| d.documents)
            .unwrap_or_default();

        // The API returns documents most-similar first; keep that order and
        // drop anything that does not parse as a chunk.
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<StoredDocument>(document) {
                Ok(doc) => results.push(ScoredChunk {
                    text: doc.text,
                    score: doc.similarity.unwrap_or_default(),
                }),
                Err(e) => warn!("Skipping malformed document from vector store: {}", e),
            }
        }

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let body = json!({ "countDocuments": {} });
        let response = self.command(&self.collection_url(), body).await?;
        Self::check_errors(&response, "countDocuments failed")?;

        let count = response
            .status
            .as_ref()
            .and_then(|s| s.get("count"))
            .and_then(|c| c.as_u64())
            .unwrap_or_default();

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> DataApiStore {
        DataApiStore::new(&server.uri(), "default_keyspace", "f1gpt", "token-123")
    }

    #[tokio::test]
    async fn create_collection_treats_already_exists_as_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/json/v1/default_keyspace"))
            .and(header("Token", "token-123"))
            .and(body_partial_json(json!({
                "createCollection": { "name": "f1gpt" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{
                    "message": "Collection 'f1gpt' already exists",
                    "errorCode": "COLLECTION_ALREADY_EXISTS"
                }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let store = store(&server);
        store
            .create_collection(768, SimilarityMetric::DotProduct)
            .await
            .unwrap();
        store
            .create_collection(768, SimilarityMetric::DotProduct)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_collection_rejects_settings_conflict() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/json/v1/default_keyspace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{
                    "message": "Collection 'f1gpt' already exists with different settings",
                    "errorCode": "EXISTING_COLLECTION_DIFFERENT_SETTINGS"
                }]
            })))
            .mount(&server)
            .await;

        let result = store(&server)
            .create_collection(1536, SimilarityMetric::DotProduct)
            .await;
        assert!(matches!(result, Err(PaddockError::VectorStore(_))));
    }

    #[tokio::test]
    async fn query_parses_typed_documents_and_skips_malformed_ones() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/json/v1/default_keyspace/f1gpt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "documents": [
                        { "text": "Max Verstappen é o campeão", "$similarity": 0.93 },
                        { "no_text_field": true },
                        { "text": "A temporada de 2025", "$similarity": 0.71 }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let results = store(&server).query(&[0.1, 0.2], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Max Verstappen é o campeão");
        assert!((results[0].score - 0.93).abs() < 0.001);
    }

    #[tokio::test]
    async fn insert_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/json/v1/default_keyspace/f1gpt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "quota exceeded", "errorCode": "QUOTA" }]
            })))
            .mount(&server)
            .await;

        let record = ChunkRecord::new("chunk".to_string(), vec![0.0; 3], None);
        let result = store(&server).insert(&record).await;
        assert!(matches!(result, Err(PaddockError::VectorStore(_))));
    }

    #[tokio::test]
    async fn count_reads_status_count() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/json/v1/default_keyspace/f1gpt"))
            .and(body_partial_json(json!({ "countDocuments": {} })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": { "count": 42 } })),
            )
            .mount(&server)
            .await;

        assert_eq!(store(&server).count().await.unwrap(), 42);
    }
}
