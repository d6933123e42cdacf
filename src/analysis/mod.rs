//! Chunk analysis and summary merging.
//!
//! Each transcript chunk is summarized by the analysis model, then the
//! per-chunk outputs are reduced into one transcript-level report.

mod analyzer;
mod merge;
mod openai;

pub use analyzer::ChunkAnalyzer;
pub use merge::{MergeOutcome, SummaryMerger};
pub use openai::OpenAIAnalyst;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Client for the summarization model.
///
/// One method covers both per-chunk analysis and the merge call; the prompt
/// carries all per-call context.
#[async_trait]
pub trait Analyst: Send + Sync {
    /// Send one prompt to the model and return its text response.
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

/// Outcome of analyzing one transcript chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkAnalysis {
    /// Key of the transcript the chunk belongs to.
    pub transcript_key: String,
    /// Chunk order within the transcript, from 0.
    pub position: usize,
    /// Model output for this chunk, when the call succeeded.
    pub summary: Option<String>,
    /// Whether the analysis call succeeded.
    pub ok: bool,
    /// What went wrong, when it did not.
    pub error: Option<String>,
}

impl ChunkAnalysis {
    pub fn success(transcript_key: &str, position: usize, summary: String) -> Self {
        Self {
            transcript_key: transcript_key.to_string(),
            position,
            summary: Some(summary),
            ok: true,
            error: None,
        }
    }

    pub fn failure(transcript_key: &str, position: usize, error: String) -> Self {
        Self {
            transcript_key: transcript_key.to_string(),
            position,
            summary: None,
            ok: false,
            error: Some(error),
        }
    }
}

/// How much of a transcript made it through analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    /// Every chunk was analyzed and the summaries were merged.
    Success,
    /// Some chunks failed; the final summary covers the rest.
    Partial,
    /// Nothing usable came out of this transcript.
    Failed,
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::Success => write!(f, "success"),
            TranscriptStatus::Partial => write!(f, "partial"),
            TranscriptStatus::Failed => write!(f, "failed"),
        }
    }
}
