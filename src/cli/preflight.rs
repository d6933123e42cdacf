//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{RecapError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Pipeline runs require the API key and the transcript directory.
    Run,
    /// Search embeds the query, so it requires the API key.
    Search,
    /// The server triggers runs and searches, so it requires the API key.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Run => {
            check_api_key()?;
            check_data_dir(settings)?;
        }
        Operation::Search => {
            check_api_key()?;
        }
        Operation::Serve => {
            check_api_key()?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(RecapError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(RecapError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if the transcript directory exists.
fn check_data_dir(settings: &Settings) -> Result<()> {
    let data_dir = settings.data_dir();
    if data_dir.is_dir() {
        Ok(())
    } else {
        Err(RecapError::Config(format!(
            "Transcript directory does not exist: {}. Set [source].data_dir in the config file.",
            data_dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_data_dir() {
        let dir = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.source.data_dir = dir.path().to_string_lossy().into_owned();
        assert!(check_data_dir(&settings).is_ok());

        settings.source.data_dir = dir
            .path()
            .join("does-not-exist")
            .to_string_lossy()
            .into_owned();
        let err = check_data_dir(&settings).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
