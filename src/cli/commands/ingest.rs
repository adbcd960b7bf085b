//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::Ingestor;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(urls: &[String], fresh: bool, settings: Settings) -> Result<()> {
    let urls = if urls.is_empty() {
        settings.sources.urls.clone()
    } else {
        urls.to_vec()
    };

    if urls.is_empty() {
        Output::warning("No source URLs configured.");
        Output::info("Add URLs under [sources] in the config file, or pass them as arguments.");
        return Ok(());
    }

    let mut ingestor = Ingestor::from_settings(&settings)?;

    if fresh {
        ingestor.reset_checkpoint()?;
        Output::info("Checkpoint cleared, re-ingesting from scratch.");
        Output::warning("Re-ingestion appends records; clear the collection to avoid duplicates.");
    }

    Output::header("Paddock Ingest");
    println!();
    Output::info(&format!("Ingesting {} source(s)...", urls.len()));

    let report = ingestor.run(&urls).await?;

    println!();
    Output::kv("URLs processed", &report.urls_processed.to_string());
    Output::kv("URLs already done", &report.urls_already_done.to_string());
    Output::kv("URLs failed", &report.urls_failed.to_string());
    Output::kv("Chunks inserted", &report.chunks_inserted.to_string());
    Output::kv("Chunks skipped (failed)", &report.chunks_failed.to_string());
    Output::kv("Chunks resumed", &report.chunks_resumed.to_string());
    println!();

    if report.urls_failed > 0 || report.chunks_failed > 0 {
        Output::warning("Ingestion finished with failures; re-run to retry incomplete URLs.");
    } else {
        Output::success("Ingestion complete.");
    }

    Ok(())
}
