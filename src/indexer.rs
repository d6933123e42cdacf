//! Vector indexing stage.
//!
//! Embeds the successfully analyzed chunks of a transcript and writes them
//! to the vector index. Indexing is best-effort: problems lower the indexed
//! point count but never fail the transcript.

use crate::analysis::ChunkAnalysis;
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::source::parse_transcript_key;
use crate::vector_index::{Point, PointPayload, VectorIndex};
use std::sync::Arc;
use tracing::{debug, warn};

/// Embeds analyzed chunks and upserts them as points.
pub struct VectorIndexer {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl VectorIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Index one transcript's chunks, returning how many points were written.
    ///
    /// Only chunks whose analysis succeeded are indexed. `analyses` must be
    /// the analyzer's output for `chunks`, so the two line up by position.
    pub async fn index_chunks(&self, chunks: &[Chunk], analyses: &[ChunkAnalysis]) -> usize {
        let analyzed: Vec<&Chunk> = chunks
            .iter()
            .zip(analyses)
            .filter(|(_, analysis)| analysis.ok)
            .map(|(chunk, _)| chunk)
            .collect();

        if analyzed.is_empty() {
            return 0;
        }

        let texts: Vec<String> = analyzed.iter().map(|c| c.text.clone()).collect();
        let vectors = match self.embedder.embed_batch(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("embedding failed, skipping indexing: {}", e);
                return 0;
            }
        };

        if vectors.len() != analyzed.len() {
            warn!(
                expected = analyzed.len(),
                got = vectors.len(),
                "embedding count mismatch, skipping indexing"
            );
            return 0;
        }

        let key = &analyzed[0].transcript_key;
        let (source_key, transcript_index) =
            parse_transcript_key(key).unwrap_or((key.as_str(), 0));

        let points: Vec<Point> = analyzed
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                Point::new(
                    vector,
                    PointPayload {
                        transcript_key: chunk.transcript_key.clone(),
                        source_key: source_key.to_string(),
                        transcript_index,
                        position: chunk.position,
                        text: chunk.text.clone(),
                    },
                )
            })
            .collect();

        match self.index.upsert(&points).await {
            Ok(written) => {
                debug!(points = written, transcript_key = %key, "indexed transcript chunks");
                written
            }
            Err(e) => {
                warn!("vector upsert failed: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ChunkAnalysis;
    use crate::error::{RecapError, Result};
    use crate::vector_index::{MemoryVectorIndex, SearchHit};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubEmbedder {
        fail: bool,
        batch_calls: Mutex<usize>,
    }

    impl StubEmbedder {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                batch_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut batch = self.embed_batch(&[text.to_string()]).await?;
            Ok(batch.remove(0))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            *self.batch_calls.lock().unwrap() += 1;
            if self.fail {
                return Err(RecapError::Embedding("backend down".to_string()));
            }
            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn upsert(&self, _points: &[Point]) -> Result<usize> {
            Err(RecapError::VectorIndex("connection refused".to_string()))
        }

        async fn search(&self, _query_vector: &[f32], _limit: usize) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }

        async fn point_count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    fn chunk_at(position: usize, text: &str) -> Chunk {
        Chunk {
            transcript_key: "vidA.json::transcript_0".to_string(),
            position,
            text: text.to_string(),
            char_start: 0,
            char_end: text.chars().count(),
        }
    }

    #[tokio::test]
    async fn test_indexes_only_successfully_analyzed_chunks() {
        let index = Arc::new(MemoryVectorIndex::new());
        let indexer = Arc::new(VectorIndexer::new(
            Arc::new(StubEmbedder::new(false)),
            Arc::clone(&index) as Arc<dyn VectorIndex>,
        ));

        let chunks = vec![chunk_at(0, "aa"), chunk_at(1, "bb"), chunk_at(2, "cc")];
        let analyses = vec![
            ChunkAnalysis::success("vidA.json::transcript_0", 0, "s0".to_string()),
            ChunkAnalysis::failure("vidA.json::transcript_0", 1, "boom".to_string()),
            ChunkAnalysis::success("vidA.json::transcript_0", 2, "s2".to_string()),
        ];

        let written = indexer.index_chunks(&chunks, &analyses).await;

        assert_eq!(written, 2);
        assert_eq!(index.point_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_no_successful_chunks_skips_embedding() {
        let embedder = Arc::new(StubEmbedder::new(false));
        let indexer = VectorIndexer::new(
            Arc::clone(&embedder) as Arc<dyn Embedder>,
            Arc::new(MemoryVectorIndex::new()),
        );

        let chunks = vec![chunk_at(0, "aa")];
        let analyses = vec![ChunkAnalysis::failure(
            "vidA.json::transcript_0",
            0,
            "boom".to_string(),
        )];

        assert_eq!(indexer.index_chunks(&chunks, &analyses).await, 0);
        assert_eq!(*embedder.batch_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_yields_zero_points() {
        let index = Arc::new(MemoryVectorIndex::new());
        let indexer = VectorIndexer::new(
            Arc::new(StubEmbedder::new(true)),
            Arc::clone(&index) as Arc<dyn VectorIndex>,
        );

        let chunks = vec![chunk_at(0, "aa")];
        let analyses = vec![ChunkAnalysis::success(
            "vidA.json::transcript_0",
            0,
            "s0".to_string(),
        )];

        assert_eq!(indexer.index_chunks(&chunks, &analyses).await, 0);
        assert_eq!(index.point_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_failure_yields_zero_points() {
        let indexer = VectorIndexer::new(Arc::new(StubEmbedder::new(false)), Arc::new(FailingIndex));

        let chunks = vec![chunk_at(0, "aa")];
        let analyses = vec![ChunkAnalysis::success(
            "vidA.json::transcript_0",
            0,
            "s0".to_string(),
        )];

        assert_eq!(indexer.index_chunks(&chunks, &analyses).await, 0);
    }

    #[tokio::test]
    async fn test_reindexing_replaces_points_instead_of_duplicating() {
        let index = Arc::new(MemoryVectorIndex::new());
        let indexer = VectorIndexer::new(
            Arc::new(StubEmbedder::new(false)),
            Arc::clone(&index) as Arc<dyn VectorIndex>,
        );

        let chunks = vec![chunk_at(0, "aa"), chunk_at(1, "bb")];
        let analyses = vec![
            ChunkAnalysis::success("vidA.json::transcript_0", 0, "s0".to_string()),
            ChunkAnalysis::success("vidA.json::transcript_0", 1, "s1".to_string()),
        ];

        indexer.index_chunks(&chunks, &analyses).await;
        indexer.index_chunks(&chunks, &analyses).await;

        assert_eq!(index.point_count().await.unwrap(), 2);
    }
}
