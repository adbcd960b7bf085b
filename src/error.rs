//! Error types for Paddock.

use thiserror::Error;

/// Library-level error type for Paddock operations.
#[derive(Error, Debug)]
pub enum PaddockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scrape failed: {0}")]
    Scrape(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Paddock operations.
pub type Result<T> = std::result::Result<T, PaddockError>;
