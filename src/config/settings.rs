//! Configuration settings for Recap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub chunking: ChunkingSettings,
    pub analysis: AnalysisSettings,
    pub embedding: EmbeddingSettings,
    pub vector_index: VectorIndexSettings,
    pub pipeline: PipelineSettings,
    pub report: ReportSettings,
    pub prompts: PromptSettings,
}

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Directory holding transcript JSON objects.
    pub data_dir: String,
    /// Default key prefix to process.
    pub prefix: String,
    /// Maximum number of objects to read per run.
    pub object_limit: usize,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.recap/transcripts".to_string(),
            prefix: String::new(),
            object_limit: 3,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Window size in characters.
    pub chunk_size_chars: usize,
    /// Overlap between consecutive windows in characters.
    pub overlap_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size_chars: 6000,
            overlap_chars: 400,
        }
    }
}

/// Reasoning depth requested from the analysis model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for ThinkingLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ThinkingLevel::Low),
            "medium" => Ok(ThinkingLevel::Medium),
            "high" => Ok(ThinkingLevel::High),
            _ => Err(format!("Unknown thinking level: {}", s)),
        }
    }
}

impl std::fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThinkingLevel::Low => write!(f, "low"),
            ThinkingLevel::Medium => write!(f, "medium"),
            ThinkingLevel::High => write!(f, "high"),
        }
    }
}

/// Chunk analysis and summary merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Model used for per-chunk analysis and the merge call.
    pub model: String,
    /// How much reasoning effort to request from the model.
    pub thinking_level: ThinkingLevel,
    /// Maximum concurrent per-chunk API calls.
    pub max_concurrent: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            model: "o4-mini".to_string(),
            thinking_level: ThinkingLevel::Medium,
            max_concurrent: 2,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexSettings {
    /// Index chunk vectors during pipeline runs.
    pub enabled: bool,
    /// Vector index provider (qdrant, memory).
    pub provider: String,
    /// Qdrant base URL (for qdrant provider).
    pub url: String,
    /// Qdrant API key, if the instance requires one.
    pub api_key: Option<String>,
    /// Collection holding transcript chunk points.
    pub collection: String,
}

impl Default for VectorIndexSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "qdrant".to_string(),
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "transcript_chunks".to_string(),
        }
    }
}

/// Pipeline run settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Wall-clock budget for one run in seconds. 0 disables the deadline.
    pub run_timeout_seconds: u64,
}

/// Run report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Default path for the plain-text run report.
    pub output_file: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_file: "transcript_analysis.txt".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded transcript data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.source.data_dir)
    }

    /// Deadline budget for a pipeline run, if one is configured.
    pub fn run_timeout(&self) -> Option<std::time::Duration> {
        match self.pipeline.run_timeout_seconds {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}
