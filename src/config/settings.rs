//! Configuration settings for Paddock.

use crate::vector_store::SimilarityMetric;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables recognized as configuration overrides.
pub const VECTOR_DB_NAMESPACE_VAR: &str = "VECTOR_DB_NAMESPACE";
pub const VECTOR_DB_COLLECTION_VAR: &str = "VECTOR_DB_COLLECTION";
pub const VECTOR_DB_API_ENDPOINT_VAR: &str = "VECTOR_DB_API_ENDPOINT";
pub const VECTOR_DB_APPLICATION_TOKEN_VAR: &str = "VECTOR_DB_APPLICATION_TOKEN";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub sources: SourceSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub scrape: ScrapeSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.paddock".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Pages ingested into the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// URLs scraped by `paddock ingest`.
    pub urls: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://pt.wikipedia.org/wiki/Campeonato_Mundial_de_F%C3%B3rmula_1_de_2025"
                    .to_string(),
            ],
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of shared context between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 200,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions; must match the vector collection.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 768,
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StoreProvider {
    /// In-memory store, for tests and throwaway runs.
    Memory,
    /// Local SQLite store (default).
    #[default]
    Sqlite,
    /// Hosted JSON Document-API store.
    DataApi,
}

impl std::str::FromStr for StoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreProvider::Memory),
            "sqlite" => Ok(StoreProvider::Sqlite),
            "data-api" | "dataapi" => Ok(StoreProvider::DataApi),
            _ => Err(format!("Unknown vector store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Memory => write!(f, "memory"),
            StoreProvider::Sqlite => write!(f, "sqlite"),
            StoreProvider::DataApi => write!(f, "data-api"),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (memory, sqlite, data-api).
    pub provider: StoreProvider,
    /// Path to the SQLite database (for the sqlite provider).
    pub sqlite_path: String,
    /// Name of the vector collection.
    pub collection: String,
    /// Similarity metric for the collection.
    pub metric: SimilarityMetric,
    /// Data API endpoint URL (data-api provider; env `VECTOR_DB_API_ENDPOINT`).
    pub api_endpoint: Option<String>,
    /// Keyspace/namespace (data-api provider; env `VECTOR_DB_NAMESPACE`).
    pub namespace: Option<String>,
    /// Application token (data-api provider; env `VECTOR_DB_APPLICATION_TOKEN`).
    #[serde(skip_serializing)]
    pub application_token: Option<String>,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sqlite,
            sqlite_path: "~/.paddock/vectors.db".to_string(),
            collection: "f1gpt".to_string(),
            metric: SimilarityMetric::DotProduct,
            api_endpoint: None,
            namespace: None,
            application_token: None,
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Chat model for response generation.
    pub model: String,
    /// Maximum number of context chunks retrieved per request.
    pub max_context_chunks: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_context_chunks: 10,
        }
    }
}

/// Scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    /// Page navigation timeout in seconds.
    pub navigation_timeout_seconds: u64,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            navigation_timeout_seconds: 30,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply
    /// environment overrides.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_from(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        Ok(settings)
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// Taking the lookup as a parameter keeps this testable without touching
    /// process-global environment state.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(namespace) = lookup(VECTOR_DB_NAMESPACE_VAR) {
            self.vector_store.namespace = Some(namespace);
        }
        if let Some(collection) = lookup(VECTOR_DB_COLLECTION_VAR) {
            self.vector_store.collection = collection;
        }
        if let Some(endpoint) = lookup(VECTOR_DB_API_ENDPOINT_VAR) {
            self.vector_store.api_endpoint = Some(endpoint);
        }
        if let Some(token) = lookup(VECTOR_DB_APPLICATION_TOKEN_VAR) {
            self.vector_store.application_token = Some(token);
        }
    }

    /// Check that everything ingestion needs is present.
    ///
    /// Ingestion treats missing configuration as fatal at startup; the
    /// request path instead degrades to ungrounded generation.
    pub fn validate_for_ingest(&self) -> crate::error::Result<()> {
        if crate::openai::api_key().is_none() {
            return Err(crate::error::PaddockError::Config(format!(
                "{} is not set; it is required for ingestion",
                crate::openai::LLM_API_KEY_VAR
            )));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(crate::error::PaddockError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.vector_store.provider == StoreProvider::DataApi {
            for (value, var) in [
                (&self.vector_store.api_endpoint, VECTOR_DB_API_ENDPOINT_VAR),
                (&self.vector_store.namespace, VECTOR_DB_NAMESPACE_VAR),
                (
                    &self.vector_store.application_token,
                    VECTOR_DB_APPLICATION_TOKEN_VAR,
                ),
            ] {
                if value.is_none() {
                    return Err(crate::error::PaddockError::Config(format!(
                        "{} is not set; it is required for the data-api vector store",
                        var
                    )));
                }
            }
        }

        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PaddockError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("paddock")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Path of the ingestion checkpoint file.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.data_dir().join("ingest-checkpoint.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 512);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.embedding.dimensions, 768);
        assert_eq!(settings.rag.max_context_chunks, 10);
        assert_eq!(settings.vector_store.provider, StoreProvider::Sqlite);
        assert_eq!(settings.sources.urls.len(), 1);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut settings = Settings::default();
        settings.apply_env_from(|key| match key {
            VECTOR_DB_NAMESPACE_VAR => Some("default_keyspace".to_string()),
            VECTOR_DB_COLLECTION_VAR => Some("f1gpt_prod".to_string()),
            VECTOR_DB_API_ENDPOINT_VAR => Some("https://db.example.com".to_string()),
            VECTOR_DB_APPLICATION_TOKEN_VAR => Some("AstraCS:abc".to_string()),
            _ => None,
        });

        assert_eq!(settings.vector_store.namespace.as_deref(), Some("default_keyspace"));
        assert_eq!(settings.vector_store.collection, "f1gpt_prod");
        assert_eq!(
            settings.vector_store.api_endpoint.as_deref(),
            Some("https://db.example.com")
        );
        assert_eq!(
            settings.vector_store.application_token.as_deref(),
            Some("AstraCS:abc")
        );
    }

    #[test]
    fn missing_env_leaves_file_settings_alone() {
        let mut settings = Settings::default();
        settings.vector_store.collection = "from_file".to_string();
        settings.apply_env_from(|_| None);
        assert_eq!(settings.vector_store.collection, "from_file");
    }

    #[test]
    fn ingest_validation_rejects_data_api_without_credentials() {
        let mut settings = Settings::default();
        settings.vector_store.provider = StoreProvider::DataApi;
        // Independent of LLM_API_KEY: bad chunking config fails first.
        settings.chunking.chunk_overlap = settings.chunking.chunk_size;
        assert!(settings.validate_for_ingest().is_err());
    }

    #[test]
    fn settings_roundtrip_through_toml() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.vector_store.collection, settings.vector_store.collection);
        assert_eq!(parsed.chunking.chunk_size, settings.chunking.chunk_size);
    }
}
