//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, Prompts};
pub use settings::{
    AnalysisSettings, ChunkingSettings, EmbeddingSettings, PipelineSettings, PromptSettings,
    ReportSettings, Settings, SourceSettings, ThinkingLevel, VectorIndexSettings,
};
