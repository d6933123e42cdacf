//! Run command implementation.

use crate::analysis::TranscriptStatus;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::report;
use crate::source::FsTranscriptSource;
use anyhow::Result;
use std::path::Path;

/// Run the pipeline command.
pub async fn run_pipeline(
    prefix: Option<String>,
    limit: Option<usize>,
    output: Option<String>,
    no_index: bool,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Run, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if no_index {
        settings.vector_index.enabled = false;
    }

    let prefix = prefix.unwrap_or_else(|| settings.source.prefix.clone());
    let limit = limit.unwrap_or(settings.source.object_limit);
    let report_path = output.unwrap_or_else(|| settings.report.output_file.clone());

    Output::info(&format!(
        "Analyzing transcripts under '{}' (limit {})",
        prefix, limit
    ));

    let source = FsTranscriptSource::new(settings.data_dir());
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Running pipeline...");
    let summary = orchestrator.run_from_source(&source, &prefix, limit).await;
    spinner.finish_and_clear();

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            Output::error(&format!("Pipeline run failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    };

    for object in summary.objects.iter().filter(|o| o.error.is_some()) {
        Output::error(&format!(
            "{}: {}",
            object.key,
            object.error.as_deref().unwrap_or("load failed")
        ));
    }

    for result in summary.run.results.values() {
        match result.status {
            TranscriptStatus::Success => Output::success(&format!(
                "{}: {} chunks, {} points indexed",
                result.transcript_key, result.chunk_count, result.indexed_point_count
            )),
            TranscriptStatus::Partial => Output::warning(&format!(
                "{}: partial ({} chunks, {} points indexed)",
                result.transcript_key, result.chunk_count, result.indexed_point_count
            )),
            TranscriptStatus::Failed => Output::error(&format!(
                "{}: {}",
                result.transcript_key,
                result.error.as_deref().unwrap_or("failed")
            )),
        }
    }

    println!();
    Output::info(&format!(
        "Run complete: {} succeeded, {} partial, {} failed ({} objects, {} transcripts)",
        summary.run.succeeded,
        summary.run.partial,
        summary.run.failed,
        summary.objects_processed,
        summary.transcripts_found
    ));

    report::write_report(&summary, Path::new(&report_path))?;
    Output::success(&format!("Report written to {}", report_path));

    Ok(())
}
