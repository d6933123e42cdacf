//! Summary merging.
//!
//! Reduces the ordered per-chunk analyses of one transcript into a single
//! final report.

use super::{Analyst, ChunkAnalysis, TranscriptStatus};
use crate::config::Prompts;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Result of merging one transcript's chunk analyses.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub final_summary: Option<String>,
    pub status: TranscriptStatus,
    pub error: Option<String>,
}

/// Merges per-chunk summaries into one transcript report.
pub struct SummaryMerger {
    analyst: Arc<dyn Analyst>,
    prompts: Prompts,
}

impl SummaryMerger {
    pub fn new(analyst: Arc<dyn Analyst>, prompts: Prompts) -> Self {
        Self { analyst, prompts }
    }

    /// Merge the analyses of one transcript.
    ///
    /// All chunks ok gives Success, a mix gives Partial built from the
    /// successful chunks in position order, and nothing usable gives Failed
    /// with no summary. A failed merge call also gives Failed, whatever the
    /// per-chunk results were.
    pub async fn merge(&self, analyses: &[ChunkAnalysis]) -> MergeOutcome {
        let successful: Vec<&ChunkAnalysis> = analyses.iter().filter(|a| a.ok).collect();

        if successful.is_empty() {
            return MergeOutcome {
                final_summary: None,
                status: TranscriptStatus::Failed,
                error: Some("no chunk analyses succeeded".to_string()),
            };
        }

        let status = if successful.len() == analyses.len() {
            TranscriptStatus::Success
        } else {
            TranscriptStatus::Partial
        };

        // Chunk numbering stays 1-based and keeps the source positions, so
        // gaps are visible when some chunks failed.
        let joined = successful
            .iter()
            .map(|a| {
                format!(
                    "Chunk {} Analysis:\n{}",
                    a.position + 1,
                    a.summary.as_deref().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut vars = HashMap::new();
        vars.insert("analyses".to_string(), joined);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.analysis.merge, &vars);

        match self.analyst.summarize(&prompt).await {
            Ok(summary) => MergeOutcome {
                final_summary: Some(summary),
                status,
                error: None,
            },
            Err(e) => {
                warn!("summary merge failed: {}", e);
                MergeOutcome {
                    final_summary: None,
                    status: TranscriptStatus::Failed,
                    error: Some(format!("merge failed: {}", e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecapError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingAnalyst {
        fail: bool,
        prompts_seen: Mutex<Vec<String>>,
    }

    impl RecordingAnalyst {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                prompts_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Analyst for RecordingAnalyst {
        async fn summarize(&self, prompt: &str) -> crate::error::Result<String> {
            self.prompts_seen.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(RecapError::OpenAI("rate limited".to_string()))
            } else {
                Ok("merged report".to_string())
            }
        }
    }

    fn ok_analysis(position: usize, summary: &str) -> ChunkAnalysis {
        ChunkAnalysis::success("k", position, summary.to_string())
    }

    fn failed_analysis(position: usize) -> ChunkAnalysis {
        ChunkAnalysis::failure("k", position, "boom".to_string())
    }

    #[tokio::test]
    async fn test_all_ok_merges_to_success() {
        let merger = SummaryMerger::new(Arc::new(RecordingAnalyst::new(false)), Prompts::default());
        let outcome = merger
            .merge(&[ok_analysis(0, "a"), ok_analysis(1, "b")])
            .await;

        assert_eq!(outcome.status, TranscriptStatus::Success);
        assert_eq!(outcome.final_summary.as_deref(), Some("merged report"));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_mixed_results_merge_to_partial_in_order() {
        let analyst = Arc::new(RecordingAnalyst::new(false));
        let merger = SummaryMerger::new(Arc::clone(&analyst) as Arc<dyn Analyst>, Prompts::default());

        let outcome = merger
            .merge(&[
                ok_analysis(0, "first summary"),
                failed_analysis(1),
                ok_analysis(2, "third summary"),
            ])
            .await;

        assert_eq!(outcome.status, TranscriptStatus::Partial);
        assert!(outcome.final_summary.is_some());

        let seen = analyst.prompts_seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Chunk 1 Analysis:\nfirst summary"));
        assert!(seen[0].contains("Chunk 3 Analysis:\nthird summary"));
        assert!(!seen[0].contains("Chunk 2 Analysis:"));
        let first = seen[0].find("Chunk 1 Analysis").unwrap();
        let third = seen[0].find("Chunk 3 Analysis").unwrap();
        assert!(first < third);
    }

    #[tokio::test]
    async fn test_nothing_usable_fails_without_model_call() {
        let analyst = Arc::new(RecordingAnalyst::new(false));
        let merger = SummaryMerger::new(Arc::clone(&analyst) as Arc<dyn Analyst>, Prompts::default());

        let outcome = merger
            .merge(&[failed_analysis(0), failed_analysis(1)])
            .await;

        assert_eq!(outcome.status, TranscriptStatus::Failed);
        assert!(outcome.final_summary.is_none());
        assert!(outcome.error.is_some());
        assert!(analyst.prompts_seen.lock().unwrap().is_empty());

        let empty = merger.merge(&[]).await;
        assert_eq!(empty.status, TranscriptStatus::Failed);
    }

    #[tokio::test]
    async fn test_merge_call_failure_fails_the_transcript() {
        let merger = SummaryMerger::new(Arc::new(RecordingAnalyst::new(true)), Prompts::default());
        let outcome = merger
            .merge(&[ok_analysis(0, "a"), ok_analysis(1, "b")])
            .await;

        assert_eq!(outcome.status, TranscriptStatus::Failed);
        assert!(outcome.final_summary.is_none());
        assert!(outcome.error.as_deref().unwrap().contains("merge failed"));
    }
}
