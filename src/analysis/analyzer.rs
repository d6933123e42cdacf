//! Per-chunk analysis driver.

use super::{Analyst, ChunkAnalysis};
use crate::chunking::Chunk;
use crate::config::Prompts;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Runs the analysis model over every chunk of a transcript.
///
/// Chunk calls run concurrently up to a configured bound. A failed call is
/// recorded as a failed analysis for that chunk only; siblings keep going.
pub struct ChunkAnalyzer {
    analyst: Arc<dyn Analyst>,
    prompts: Prompts,
    max_concurrent: usize,
}

impl ChunkAnalyzer {
    pub fn new(analyst: Arc<dyn Analyst>, prompts: Prompts, max_concurrent: usize) -> Self {
        Self {
            analyst,
            prompts,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Render the per-chunk prompt. Positions are shown 1-based.
    fn chunk_prompt(&self, chunk: &Chunk, total: usize) -> String {
        let mut vars = HashMap::new();
        vars.insert("position".to_string(), (chunk.position + 1).to_string());
        vars.insert("total".to_string(), total.to_string());
        vars.insert("chunk".to_string(), chunk.text.clone());
        self.prompts
            .render_with_custom(&self.prompts.analysis.chunk, &vars)
    }

    /// Analyze every chunk, returning one entry per chunk in position order.
    pub async fn analyze(&self, chunks: &[Chunk]) -> Vec<ChunkAnalysis> {
        let total = chunks.len();

        let mut analyses: Vec<(usize, ChunkAnalysis)> = stream::iter(chunks)
            .map(|chunk| {
                let prompt = self.chunk_prompt(chunk, total);
                let analyst = Arc::clone(&self.analyst);
                async move {
                    let analysis = match analyst.summarize(&prompt).await {
                        Ok(summary) => {
                            ChunkAnalysis::success(&chunk.transcript_key, chunk.position, summary)
                        }
                        Err(e) => {
                            warn!(
                                transcript_key = %chunk.transcript_key,
                                position = chunk.position,
                                "chunk analysis failed: {}",
                                e
                            );
                            ChunkAnalysis::failure(
                                &chunk.transcript_key,
                                chunk.position,
                                e.to_string(),
                            )
                        }
                    };
                    (chunk.position, analysis)
                }
            })
            .buffer_unordered(self.max_concurrent)
            // Erase the adapter types: the closure over `&Chunk` must not leak
            // into callers' auto-trait checks (rust-lang/rust#89976).
            .boxed()
            .collect()
            .await;

        // Rejoin in position order regardless of completion order
        analyses.sort_by_key(|(position, _)| *position);
        analyses.into_iter().map(|(_, analysis)| analysis).collect()
    }
}
