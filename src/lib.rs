//! Paddock - Formula 1 RAG chat
//!
//! A web chat assistant that answers questions about Formula 1 using a
//! large-language-model API augmented with retrieval against a vector store.
//!
//! # Overview
//!
//! Paddock has two operational halves:
//!
//! - An offline ingestion pipeline (`paddock ingest`) that scrapes a set of
//!   web pages with a headless browser, splits their text into overlapping
//!   chunks, embeds each chunk, and stores `{vector, text}` records in a
//!   vector collection.
//! - An online request path (`paddock serve`) that embeds the latest user
//!   message, retrieves the nearest chunks, stuffs them into a system
//!   prompt, and forwards the conversation to a chat-completion API. A
//!   static chat UI is served from the same process.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `scrape` - Headless-browser page scraping
//! - `chunking` - Overlapping text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `completion` - Chat-completion client
//! - `chat` - Request-path engine (retrieve, compose, generate)
//! - `ingest` - Offline ingestion driver
//! - `server` - HTTP API and chat UI
//!
//! # Example
//!
//! ```rust,no_run
//! use paddock::chat::ChatEngine;
//! use paddock::completion::{Message, Role};
//! use paddock::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = ChatEngine::from_settings(&settings)?;
//!
//!     let answer = engine
//!         .respond(&[Message::new(Role::User, "Quem é o atual campeão mundial?")])
//!         .await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod chunking;
pub mod cli;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod scrape;
pub mod server;
pub mod vector_store;

pub use error::{PaddockError, Result};
