//! Configuration module for Paddock.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, PromptSettings, RagSettings,
    ScrapeSettings, ServerSettings, Settings, SourceSettings, StoreProvider,
    VectorStoreSettings, VECTOR_DB_API_ENDPOINT_VAR, VECTOR_DB_APPLICATION_TOKEN_VAR,
    VECTOR_DB_COLLECTION_VAR, VECTOR_DB_NAMESPACE_VAR,
};
