//! Text chunking for breaking scraped pages into embeddable segments.
//!
//! Splits raw text into overlapping fixed-size windows, preferring natural
//! boundaries (paragraph, line, sentence, word) over hard character cuts.

use crate::error::{PaddockError, Result};

/// Splits text into overlapping chunks measured in characters.
///
/// Invariants:
/// - every chunk is at most `chunk_size` characters long;
/// - consecutive chunks share exactly `chunk_overlap` characters;
/// - concatenating the first chunk with each subsequent chunk minus its
///   first `chunk_overlap` characters reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a new splitter. `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PaddockError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(PaddockError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// The configured chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into overlapping chunks.
    ///
    /// Empty input yields an empty sequence. All offsets are computed in
    /// characters, never bytes, so multi-byte text is split safely.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus an end sentinel, so chunks can be
        // sliced out of the original text without re-walking it.
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let window_end = (start + self.chunk_size).min(total);
            if window_end == total {
                chunks.push(text[offsets[start]..].to_string());
                break;
            }

            let end = self.find_split(&chars, start, window_end);
            chunks.push(text[offsets[start]..offsets[end]].to_string());

            // The next chunk re-covers the last `chunk_overlap` characters.
            start = end - self.chunk_overlap;
        }

        chunks
    }

    /// Find the split position in `(start + overlap, window_end]`, preferring
    /// paragraph breaks, then line breaks, then sentence ends, then word
    /// boundaries, falling back to a hard cut at `window_end`.
    ///
    /// The lower bound keeps the split strictly past the overlap region so the
    /// loop always makes progress and the overlap invariant holds.
    fn find_split(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let lo = start + self.chunk_overlap + 1;

        let paragraph = |p: usize| p >= 2 && chars[p - 1] == '\n' && chars[p - 2] == '\n';
        let line = |p: usize| chars[p - 1] == '\n';
        let sentence =
            |p: usize| p >= 2 && chars[p - 1] == ' ' && matches!(chars[p - 2], '.' | '!' | '?');
        let word = |p: usize| chars[p - 1] == ' ';

        for boundary in [
            &paragraph as &dyn Fn(usize) -> bool,
            &line,
            &sentence,
            &word,
        ] {
            if let Some(p) = (lo..=window_end).rev().find(|&p| boundary(p)) {
                return p;
            }
        }

        window_end
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        // Defaults mirror the ingestion configuration: 512-char chunks with
        // 200 characters of shared context between neighbors.
        Self {
            chunk_size: 512,
            chunk_overlap: 200,
        }
    }
}
