//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");
    let hits = match orchestrator.embedder().embed(query).await {
        Ok(query_vector) => orchestrator.vector_index().search(&query_vector, limit).await,
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();

    match hits {
        Ok(hits) if hits.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(hits) => {
            Output::success(&format!("Found {} results", hits.len()));

            for hit in &hits {
                Output::search_result(&hit.transcript_key, hit.position, hit.score, &hit.text);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
