//! Recap - Transcript Analysis Pipeline
//!
//! A CLI tool and library for analyzing stored transcripts: it chunks them,
//! summarizes each chunk with an LLM, merges the chunk summaries into one
//! report per transcript, and indexes the chunks in a vector database.
//!
//! # Overview
//!
//! Recap allows you to:
//! - Batch-analyze transcript JSON objects from a local directory
//! - Produce one merged summary per transcript, with per-chunk detail
//! - Index chunk embeddings for semantic search
//! - Trigger runs and searches over an HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Transcript source abstraction (local JSON objects)
//! - `chunking` - Character-window chunking
//! - `analysis` - Per-chunk analysis and summary merging
//! - `embedding` - Embedding generation
//! - `vector_index` - Vector index abstraction (Qdrant, in-memory)
//! - `indexer` - Chunk embedding and upsert
//! - `orchestrator` - Pipeline coordination
//! - `report` - Plain-text run reports
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Orchestrator;
//! use recap::source::FsTranscriptSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let source = FsTranscriptSource::new(settings.data_dir());
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Analyze up to three stored transcript objects
//!     let summary = orchestrator.run_from_source(&source, "", 3).await?;
//!     println!(
//!         "{} succeeded, {} partial, {} failed",
//!         summary.run.succeeded, summary.run.partial, summary.run.failed
//!     );
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod vector_index;

pub use error::{RecapError, Result};
