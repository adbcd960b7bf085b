//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::vector_store::open_store;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    );
    let store = open_store(&settings)?;

    let spinner = Output::spinner("Searching...");
    let result = async {
        let embedding = embedder.embed(query).await?;
        store.query(&embedding, limit).await
    }
    .await;
    spinner.finish_and_clear();

    match result {
        Ok(chunks) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
                Output::info("Run `paddock ingest` first to build the knowledge base.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));
                for chunk in &chunks {
                    Output::search_result(chunk.score, &chunk.text);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(anyhow::anyhow!("{}", e))
        }
    }
}
