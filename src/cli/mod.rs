//! CLI module for Paddock.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Paddock - Formula 1 RAG Chatbot
///
/// Scrapes Formula 1 pages into a vector knowledge base and serves a chat
/// API (plus a small web UI) that answers questions grounded in it.
#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Scrape, chunk, embed, and index source pages
    Ingest {
        /// URLs to ingest (defaults to the configured source list)
        urls: Vec<String>,

        /// Discard checkpoint progress and re-ingest everything
        #[arg(long)]
        fresh: bool,
    },

    /// Search the knowledge base for relevant chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Start the chat API server and web UI
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
