//! Offline ingestion driver.
//!
//! For each configured source URL: scrape -> chunk -> per chunk: embed ->
//! insert. Strictly sequential; one browser at a time, one chunk at a time.
//! A failed scrape aborts that URL only, a failed embed/insert skips that
//! chunk only (logged, never retried), and a checkpoint file records
//! completion so a crashed run resumes where it stopped.
//!
//! Re-running a completed ingestion with `--fresh` appends duplicate
//! records unless the operator clears the collection first.

mod checkpoint;

pub use checkpoint::IngestCheckpoint;

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::scrape::{HeadlessScraper, Scraper};
use crate::vector_store::{open_store, ChunkRecord, SimilarityMetric, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outcome of an ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    /// URLs fully processed in this run.
    pub urls_processed: usize,
    /// URLs skipped because a previous run completed them.
    pub urls_already_done: usize,
    /// URLs aborted by a scrape failure.
    pub urls_failed: usize,
    /// Chunks embedded and inserted in this run.
    pub chunks_inserted: usize,
    /// Chunks skipped after an embed/insert failure.
    pub chunks_failed: usize,
    /// Chunks skipped because the checkpoint already covered them.
    pub chunks_resumed: usize,
}

/// Drives the scrape -> chunk -> embed -> insert pipeline.
pub struct Ingestor {
    scraper: Arc<dyn Scraper>,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    metric: SimilarityMetric,
    checkpoint: IngestCheckpoint,
}

impl Ingestor {
    /// Create an ingestor with explicit components.
    pub fn new(
        scraper: Arc<dyn Scraper>,
        splitter: TextSplitter,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        metric: SimilarityMetric,
        checkpoint: IngestCheckpoint,
    ) -> Self {
        Self {
            scraper,
            splitter,
            embedder,
            store,
            metric,
            checkpoint,
        }
    }

    /// Build an ingestor from the configuration.
    ///
    /// All required settings must be present; a missing one is fatal here,
    /// before any network call.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate_for_ingest()?;

        let scraper = Arc::new(HeadlessScraper::new(Duration::from_secs(
            settings.scrape.navigation_timeout_seconds,
        )));
        let splitter = TextSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )?;
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let store = open_store(settings)?;
        let checkpoint = IngestCheckpoint::load_or_default(&settings.checkpoint_path())?;

        Ok(Self::new(
            scraper,
            splitter,
            embedder,
            store,
            settings.vector_store.metric,
            checkpoint,
        ))
    }

    /// Discard checkpoint state from previous runs.
    pub fn reset_checkpoint(&mut self) -> Result<()> {
        self.checkpoint.reset()
    }

    /// Run ingestion over the given URLs, sequentially.
    #[instrument(skip_all, fields(urls = urls.len()))]
    pub async fn run(&mut self, urls: &[String]) -> Result<IngestReport> {
        self.store
            .create_collection(self.embedder.dimensions(), self.metric)
            .await?;

        let mut report = IngestReport::default();

        for url in urls {
            if self.checkpoint.is_complete(url) {
                info!("Already ingested {}, skipping (use --fresh to redo)", url);
                report.urls_already_done += 1;
                continue;
            }

            // A failed URL aborts that URL only; the batch continues.
            match self.ingest_url(url, &mut report).await {
                Ok(()) => report.urls_processed += 1,
                Err(e) => {
                    warn!("Aborting {}: {}", url, e);
                    report.urls_failed += 1;
                }
            }
        }

        Ok(report)
    }

    async fn ingest_url(&mut self, url: &str, report: &mut IngestReport) -> Result<()> {
        info!("Scraping {}...", url);
        let text = self.scraper.scrape(url).await?;

        let chunks = self.splitter.split(&text);
        info!("Generated {} chunks", chunks.len());

        let already_done = self.checkpoint.chunks_done(url);
        if already_done > 0 {
            info!("Resuming {} at chunk {}", url, already_done + 1);
        }

        for (i, chunk) in chunks.iter().enumerate() {
            if i < already_done {
                report.chunks_resumed += 1;
                continue;
            }

            info!("Processing chunk {}/{}", i + 1, chunks.len());

            // Skip and continue on failure; never retry.
            match self.process_chunk(url, chunk).await {
                Ok(()) => report.chunks_inserted += 1,
                Err(e) => {
                    warn!("Skipping chunk {}/{} of {}: {}", i + 1, chunks.len(), url, e);
                    report.chunks_failed += 1;
                }
            }

            self.checkpoint.record_chunk(url)?;
        }

        self.checkpoint.mark_complete(url)?;
        Ok(())
    }

    async fn process_chunk(&self, url: &str, chunk: &str) -> Result<()> {
        let embedding = self.embedder.embed(chunk).await?;
        let record = ChunkRecord::new(chunk.to_string(), embedding, Some(url.to_string()));
        self.store.insert(&record).await
    }
}
