//! Pipeline orchestrator for Recap.
//!
//! Coordinates the per-transcript flow: chunk, analyze, merge, index. One
//! transcript's failure never aborts the rest of the run.

use crate::analysis::{
    Analyst, ChunkAnalyzer, OpenAIAnalyst, SummaryMerger, TranscriptStatus,
};
use crate::chunking::{self, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{RecapError, Result};
use crate::indexer::VectorIndexer;
use crate::source::{collect_transcripts, SourceObject, TranscriptSource};
use crate::vector_index::{MemoryVectorIndex, QdrantVectorIndex, VectorIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Stages a transcript moves through during a run.
///
/// Errors in any stage absorb the transcript into `Errored`; `Done` and
/// `Errored` are terminal. There is no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranscriptStage {
    Pending,
    Chunked,
    Analyzed,
    Merged,
    Indexed,
    Done,
    Errored,
}

/// The main orchestrator for the Recap pipeline.
pub struct Orchestrator {
    settings: Settings,
    analyzer: ChunkAnalyzer,
    merger: SummaryMerger,
    indexer: VectorIndexer,
    embedder: Arc<dyn Embedder>,
    vector_index: Arc<dyn VectorIndex>,
}

impl Orchestrator {
    /// Create a new orchestrator with the configured adapters.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let analyst: Arc<dyn Analyst> =
            Arc::new(OpenAIAnalyst::new(&settings.analysis, &prompts.analysis.system));
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(&settings.embedding));

        let vector_index: Arc<dyn VectorIndex> = match settings.vector_index.provider.as_str() {
            "qdrant" => Arc::new(QdrantVectorIndex::new(&settings.vector_index)),
            "memory" => Arc::new(MemoryVectorIndex::new()),
            other => {
                return Err(RecapError::Config(format!(
                    "Unknown vector index provider: {}",
                    other
                )))
            }
        };

        Ok(Self::with_components(
            settings,
            prompts,
            analyst,
            embedder,
            vector_index,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        analyst: Arc<dyn Analyst>,
        embedder: Arc<dyn Embedder>,
        vector_index: Arc<dyn VectorIndex>,
    ) -> Self {
        let analyzer = ChunkAnalyzer::new(
            Arc::clone(&analyst),
            prompts.clone(),
            settings.analysis.max_concurrent,
        );
        let merger = SummaryMerger::new(analyst, prompts);
        let indexer = VectorIndexer::new(Arc::clone(&embedder), Arc::clone(&vector_index));

        Self {
            settings,
            analyzer,
            merger,
            indexer,
            embedder,
            vector_index,
        }
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get a reference to the vector index.
    pub fn vector_index(&self) -> Arc<dyn VectorIndex> {
        self.vector_index.clone()
    }

    fn chunking_config(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size_chars,
            overlap: self.settings.chunking.overlap_chars,
        }
    }

    /// Run the pipeline over a transcript-key → text map.
    pub async fn run(&self, transcripts: &BTreeMap<String, String>) -> Result<PipelineRunResult> {
        self.run_with_deadline(transcripts, None).await
    }

    /// Run the pipeline with an optional wall-clock deadline.
    ///
    /// Once the deadline passes, no further transcripts are started; each
    /// remaining key is marked failed so the result still covers every
    /// requested transcript.
    #[instrument(skip(self, transcripts), fields(transcripts = transcripts.len()))]
    pub async fn run_with_deadline(
        &self,
        transcripts: &BTreeMap<String, String>,
        deadline: Option<Instant>,
    ) -> Result<PipelineRunResult> {
        // Bad chunking parameters fail the whole run before any work starts.
        let chunking = self.chunking_config();
        chunking.validate()?;

        info!(transcripts = transcripts.len(), "pipeline run started");

        let mut results = BTreeMap::new();
        for (key, text) in transcripts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(transcript_key = %key, "run deadline exceeded, not starting transcript");
                results.insert(
                    key.clone(),
                    Self::failed_result(key, 0, "run deadline exceeded"),
                );
                continue;
            }

            let result = self.process_transcript(key, text, &chunking).await;
            results.insert(key.clone(), result);
        }

        let succeeded = Self::count_status(&results, TranscriptStatus::Success);
        let partial = Self::count_status(&results, TranscriptStatus::Partial);
        let failed = Self::count_status(&results, TranscriptStatus::Failed);

        info!(succeeded, partial, failed, "pipeline run finished");

        Ok(PipelineRunResult {
            results,
            succeeded,
            partial,
            failed,
        })
    }

    /// Load transcripts from a source and run the pipeline over them.
    pub async fn run_from_source(
        &self,
        source: &dyn TranscriptSource,
        prefix: &str,
        limit: usize,
    ) -> Result<SourceRunSummary> {
        let objects = source.load_objects(prefix, limit).await?;
        let transcripts = collect_transcripts(&objects);
        info!(
            objects = objects.len(),
            transcripts = transcripts.len(),
            prefix,
            "loaded transcripts from source"
        );

        let deadline = self.settings.run_timeout().map(|t| Instant::now() + t);
        let run = self.run_with_deadline(&transcripts, deadline).await?;

        Ok(SourceRunSummary {
            prefix: prefix.to_string(),
            object_limit: limit,
            objects_processed: objects.len(),
            transcripts_found: transcripts.len(),
            objects,
            run,
        })
    }

    /// Process one transcript through the stage machine.
    async fn process_transcript(
        &self,
        key: &str,
        text: &str,
        chunking: &ChunkingConfig,
    ) -> TranscriptAnalysisResult {
        let mut stage = TranscriptStage::Pending;
        debug!(transcript_key = %key, stage = ?stage, "processing transcript");

        if text.trim().is_empty() {
            warn!(transcript_key = %key, "empty transcript");
            return Self::failed_result(key, 0, "empty transcript");
        }

        let chunks = match chunking::chunk(key, text, chunking) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(transcript_key = %key, "chunking failed: {}", e);
                return Self::failed_result(key, 0, &e.to_string());
            }
        };
        stage = TranscriptStage::Chunked;
        debug!(transcript_key = %key, stage = ?stage, chunks = chunks.len(), "transcript chunked");

        let analyses = self.analyzer.analyze(&chunks).await;
        stage = TranscriptStage::Analyzed;
        debug!(
            transcript_key = %key,
            stage = ?stage,
            ok = analyses.iter().filter(|a| a.ok).count(),
            total = analyses.len(),
            "chunks analyzed"
        );

        let outcome = self.merger.merge(&analyses).await;
        stage = TranscriptStage::Merged;
        debug!(transcript_key = %key, stage = ?stage, status = %outcome.status, "summaries merged");

        let indexed_point_count = if self.settings.vector_index.enabled {
            let written = self.indexer.index_chunks(&chunks, &analyses).await;
            stage = TranscriptStage::Indexed;
            debug!(transcript_key = %key, stage = ?stage, points = written, "chunks indexed");
            written
        } else {
            0
        };

        stage = if outcome.status == TranscriptStatus::Failed {
            TranscriptStage::Errored
        } else {
            TranscriptStage::Done
        };
        info!(
            transcript_key = %key,
            stage = ?stage,
            status = %outcome.status,
            chunks = chunks.len(),
            points = indexed_point_count,
            "transcript processed"
        );

        TranscriptAnalysisResult {
            transcript_key: key.to_string(),
            status: outcome.status,
            chunk_count: chunks.len(),
            chunk_analyses: analyses,
            final_summary: outcome.final_summary,
            indexed_point_count,
            error: outcome.error,
        }
    }

    fn failed_result(key: &str, chunk_count: usize, error: &str) -> TranscriptAnalysisResult {
        TranscriptAnalysisResult {
            transcript_key: key.to_string(),
            status: TranscriptStatus::Failed,
            chunk_count,
            chunk_analyses: Vec::new(),
            final_summary: None,
            indexed_point_count: 0,
            error: Some(error.to_string()),
        }
    }

    fn count_status(
        results: &BTreeMap<String, TranscriptAnalysisResult>,
        status: TranscriptStatus,
    ) -> usize {
        results.values().filter(|r| r.status == status).count()
    }
}

/// Outcome for one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptAnalysisResult {
    /// Key of the transcript.
    pub transcript_key: String,
    /// How much of the transcript made it through.
    pub status: TranscriptStatus,
    /// Number of chunks the transcript was split into.
    pub chunk_count: usize,
    /// Per-chunk analyses in position order.
    pub chunk_analyses: Vec<crate::analysis::ChunkAnalysis>,
    /// Merged transcript report, when one was produced.
    pub final_summary: Option<String>,
    /// Number of chunk vectors written to the index.
    pub indexed_point_count: usize,
    /// What failed, when something did.
    pub error: Option<String>,
}

/// Aggregate outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunResult {
    /// Per-transcript results, in key order.
    pub results: BTreeMap<String, TranscriptAnalysisResult>,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
}

/// Outcome of a source-driven pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRunSummary {
    /// Key prefix the run covered.
    pub prefix: String,
    /// Object limit the run was called with.
    pub object_limit: usize,
    /// How many objects the source returned.
    pub objects_processed: usize,
    /// How many transcripts were extracted from them.
    pub transcripts_found: usize,
    /// The loaded objects, including per-object load errors.
    pub objects: Vec<SourceObject>,
    /// The pipeline run over the extracted transcripts.
    pub run: PipelineRunResult,
}
