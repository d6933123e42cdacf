//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Recap - Transcript Analysis Pipeline
///
/// Chunks stored transcripts, summarizes them with an LLM, and indexes the
/// chunks in a vector database for semantic search.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze stored transcripts and index their chunks
    Run {
        /// Key prefix selecting which source objects to process
        #[arg(short, long)]
        prefix: Option<String>,

        /// Maximum number of source objects to process
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write the plain-text report to this file instead of the configured one
        #[arg(short, long)]
        output: Option<String>,

        /// Skip vector indexing for this run
        #[arg(long)]
        no_index: bool,
    },

    /// Search indexed transcript chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
