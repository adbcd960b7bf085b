//! Ingestion checkpoint persistence.
//!
//! Records per-URL, per-chunk completion so an interrupted run can resume
//! after the last completed chunk instead of restarting from scratch.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Progress for a single source URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlProgress {
    /// Number of leading chunks already processed.
    pub chunks_done: usize,
    /// Whether every chunk of this URL has been processed.
    pub complete: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CheckpointState {
    urls: HashMap<String, UrlProgress>,
}

/// File-backed ingestion checkpoint.
///
/// Saved after every chunk, so the window for repeated work after a crash
/// is a single chunk.
pub struct IngestCheckpoint {
    path: PathBuf,
    state: CheckpointState,
}

impl IngestCheckpoint {
    /// Load the checkpoint at `path`, or start empty if none exists.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            CheckpointState::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    /// Discard any recorded progress, removing the file.
    pub fn reset(&mut self) -> Result<()> {
        self.state = CheckpointState::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Whether this URL was fully processed in a previous run.
    pub fn is_complete(&self, url: &str) -> bool {
        self.state.urls.get(url).is_some_and(|p| p.complete)
    }

    /// Number of leading chunks already processed for this URL.
    pub fn chunks_done(&self, url: &str) -> usize {
        self.state.urls.get(url).map_or(0, |p| p.chunks_done)
    }

    /// Record that one more chunk of this URL was processed.
    pub fn record_chunk(&mut self, url: &str) -> Result<()> {
        self.state.urls.entry(url.to_string()).or_default().chunks_done += 1;
        self.save()
    }

    /// Mark a URL as fully processed.
    pub fn mark_complete(&mut self, url: &str) -> Result<()> {
        self.state.urls.entry(url.to_string()).or_default().complete = true;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint =
            IngestCheckpoint::load_or_default(&dir.path().join("checkpoint.json")).unwrap();
        assert!(!checkpoint.is_complete("https://example.com"));
        assert_eq!(checkpoint.chunks_done("https://example.com"), 0);
    }

    #[test]
    fn progress_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let url = "https://pt.wikipedia.org/wiki/F1";

        {
            let mut checkpoint = IngestCheckpoint::load_or_default(&path).unwrap();
            checkpoint.record_chunk(url).unwrap();
            checkpoint.record_chunk(url).unwrap();
            checkpoint.record_chunk(url).unwrap();
        }

        let reloaded = IngestCheckpoint::load_or_default(&path).unwrap();
        assert_eq!(reloaded.chunks_done(url), 3);
        assert!(!reloaded.is_complete(url));
    }

    #[test]
    fn completion_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        {
            let mut checkpoint = IngestCheckpoint::load_or_default(&path).unwrap();
            checkpoint.mark_complete("https://a.example").unwrap();
        }

        let reloaded = IngestCheckpoint::load_or_default(&path).unwrap();
        assert!(reloaded.is_complete("https://a.example"));
        assert!(!reloaded.is_complete("https://b.example"));
    }

    #[test]
    fn reset_discards_progress_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut checkpoint = IngestCheckpoint::load_or_default(&path).unwrap();
        checkpoint.record_chunk("https://a.example").unwrap();
        assert!(path.exists());

        checkpoint.reset().unwrap();
        assert!(!path.exists());
        assert_eq!(checkpoint.chunks_done("https://a.example"), 0);
    }
}
