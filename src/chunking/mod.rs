//! Transcript chunking.
//!
//! Splits transcript text into overlapping character windows so long
//! transcripts fit within per-call model limits.

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// One window of transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Key of the transcript this chunk belongs to.
    pub transcript_key: String,
    /// Order of this chunk within the transcript, from 0.
    pub position: usize,
    /// Text content of this chunk.
    pub text: String,
    /// Offset of the first character of the window.
    pub char_start: usize,
    /// Offset one past the last character of the window.
    pub char_end: usize,
}

/// Configuration for character-window chunking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive windows in characters.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 6000,
            overlap: 400,
        }
    }
}

impl ChunkingConfig {
    /// Reject window parameters that cannot make forward progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RecapError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(RecapError::InvalidConfig(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Characters the window start advances between consecutive chunks.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split transcript text into overlapping character windows.
///
/// Offsets count Unicode scalar values, not bytes, so multibyte content
/// never splits a code point. Input is trimmed first; empty or
/// whitespace-only text yields no chunks.
pub fn chunk(transcript_key: &str, text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + config.chunk_size).min(total);
        chunks.push(Chunk {
            transcript_key: transcript_key.to_string(),
            position: chunks.len(),
            text: chars[start..end].iter().collect(),
            char_start: start,
            char_end: end,
        });
        if end == total {
            break;
        }
        start += config.step();
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk("vidA::transcript_0", "hello world", &config(100, 10)).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, 11);
    }

    #[test]
    fn test_two_windows_with_default_sizes() {
        let text = "x".repeat(10_000);
        let chunks = chunk("vidA::transcript_0", &text, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, 6000);
        assert_eq!(chunks[1].char_start, 5600);
        assert_eq!(chunks[1].char_end, 10_000);
        assert_eq!(chunks[1].position, 1);
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text: String = ('a'..='z').cycle().take(250).collect();
        let chunks = chunk("k", &text, &config(100, 20)).unwrap();

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().skip(pair[0].text.chars().count() - 20).collect();
            let head: String = pair[1].text.chars().take(20).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_overlap_stripped_concatenation_reconstructs_input() {
        let text: String = ('a'..='z').cycle().take(1234).collect();
        let cfg = config(300, 50);
        let chunks = chunk("k", &text, &cfg).unwrap();

        let mut rebuilt = chunks[0].text.clone();
        for c in &chunks[1..] {
            rebuilt.extend(c.text.chars().skip(cfg.overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunk_count_matches_stride_formula() {
        let cfg = config(100, 20);
        for len in [1, 80, 100, 101, 180, 181, 500, 999] {
            let text = "y".repeat(len);
            let chunks = chunk("k", &text, &cfg).unwrap();
            let expected = if len <= cfg.chunk_size {
                1
            } else {
                (len - cfg.overlap).div_ceil(cfg.step())
            };
            assert_eq!(chunks.len(), expected, "len {}", len);
        }
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(chunk("k", "", &config(100, 10)).unwrap().is_empty());
        assert!(chunk("k", "   \n\t  ", &config(100, 10)).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let err = chunk("k", "text", &config(0, 0)).unwrap_err();
        assert!(matches!(err, RecapError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_chunk_size() {
        assert!(matches!(
            chunk("k", "text", &config(100, 100)),
            Err(RecapError::InvalidConfig(_))
        ));
        assert!(matches!(
            chunk("k", "text", &config(100, 150)),
            Err(RecapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_multibyte_text_counted_in_characters() {
        let text = "é".repeat(150);
        let chunks = chunk("k", &text, &config(100, 10)).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), 100);
        assert_eq!(chunks[1].char_start, 90);
        assert_eq!(chunks[1].char_end, 150);
        assert_eq!(chunks[1].text.chars().count(), 60);
    }
}
