//! Plain-text run reports.
//!
//! Renders the outcome of a pipeline run as a flat text file: a run header
//! followed by one block per transcript.

use crate::error::Result;
use crate::orchestrator::SourceRunSummary;
use chrono::Local;
use std::path::Path;
use tracing::info;

const SEPARATOR_WIDTH: usize = 80;

/// Render a run summary as a plain-text report.
pub fn render_report(summary: &SourceRunSummary) -> String {
    let mut out = String::new();

    out.push_str("Transcript Analysis Report\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Prefix: {}\n", summary.prefix));
    out.push_str(&format!("Objects Processed: {}\n", summary.objects_processed));
    out.push_str(&format!("Transcripts Found: {}\n", summary.transcripts_found));
    out.push_str(&format!("Succeeded: {}\n", summary.run.succeeded));
    out.push_str(&format!("Partial: {}\n", summary.run.partial));
    out.push_str(&format!("Failed: {}\n\n", summary.run.failed));

    // Objects that could not be loaded have no transcript blocks, so they
    // are listed up front.
    for object in summary.objects.iter().filter(|o| o.error.is_some()) {
        out.push_str(&format!("Object: {}\n", object.key));
        out.push_str(&format!(
            "Load Error: {}\n\n",
            object.error.as_deref().unwrap_or("unknown")
        ));
    }

    for result in summary.run.results.values() {
        out.push_str(&format!("Transcript: {}\n", result.transcript_key));
        out.push_str(&format!("Status: {}\n", result.status));
        out.push_str(&format!("Chunk Count: {}\n", result.chunk_count));
        if let Some(error) = &result.error {
            out.push_str(&format!("Analysis Error: {}\n", error));
        }
        if let Some(final_summary) = &result.final_summary {
            out.push_str(&format!("Summary:\n{}\n", final_summary));
        }
        out.push('\n');
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push_str("\n\n");
    }

    out
}

/// Render a run summary and write it to a file.
pub fn write_report(summary: &SourceRunSummary, path: &Path) -> Result<()> {
    let report = render_report(summary);
    std::fs::write(path, &report)?;
    info!(path = %path.display(), "run report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TranscriptStatus;
    use crate::orchestrator::{PipelineRunResult, TranscriptAnalysisResult};
    use crate::source::SourceObject;
    use std::collections::BTreeMap;

    fn result(
        key: &str,
        status: TranscriptStatus,
        summary: Option<&str>,
        error: Option<&str>,
    ) -> TranscriptAnalysisResult {
        TranscriptAnalysisResult {
            transcript_key: key.to_string(),
            status,
            chunk_count: 2,
            chunk_analyses: Vec::new(),
            final_summary: summary.map(String::from),
            indexed_point_count: 0,
            error: error.map(String::from),
        }
    }

    fn sample_summary() -> SourceRunSummary {
        let mut results = BTreeMap::new();
        results.insert(
            "a.json::transcript_0".to_string(),
            result(
                "a.json::transcript_0",
                TranscriptStatus::Success,
                Some("Everything went fine."),
                None,
            ),
        );
        results.insert(
            "a.json::transcript_1".to_string(),
            result(
                "a.json::transcript_1",
                TranscriptStatus::Failed,
                None,
                Some("empty transcript"),
            ),
        );

        SourceRunSummary {
            prefix: "daily/".to_string(),
            object_limit: 3,
            objects_processed: 2,
            transcripts_found: 2,
            objects: vec![
                SourceObject {
                    key: "a.json".to_string(),
                    transcripts: vec!["text".to_string(), String::new()],
                    error: None,
                },
                SourceObject {
                    key: "b.json".to_string(),
                    transcripts: Vec::new(),
                    error: Some("invalid JSON: expected value".to_string()),
                },
            ],
            run: PipelineRunResult {
                results,
                succeeded: 1,
                partial: 0,
                failed: 1,
            },
        }
    }

    #[test]
    fn test_report_header_counts() {
        let report = render_report(&sample_summary());
        assert!(report.contains("Prefix: daily/"));
        assert!(report.contains("Objects Processed: 2"));
        assert!(report.contains("Transcripts Found: 2"));
        assert!(report.contains("Succeeded: 1"));
        assert!(report.contains("Failed: 1"));
    }

    #[test]
    fn test_report_lists_object_load_errors() {
        let report = render_report(&sample_summary());
        assert!(report.contains("Object: b.json"));
        assert!(report.contains("Load Error: invalid JSON: expected value"));
        // Healthy objects are covered by their transcript blocks
        assert!(!report.contains("Object: a.json"));
    }

    #[test]
    fn test_report_renders_one_block_per_transcript() {
        let report = render_report(&sample_summary());
        assert!(report.contains("Transcript: a.json::transcript_0"));
        assert!(report.contains("Status: success"));
        assert!(report.contains("Summary:\nEverything went fine."));
        assert!(report.contains("Transcript: a.json::transcript_1"));
        assert!(report.contains("Analysis Error: empty transcript"));
        assert_eq!(report.matches(&"-".repeat(SEPARATOR_WIDTH)).count(), 2);
    }

    #[test]
    fn test_write_report_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.txt");

        write_report(&sample_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Transcript Analysis Report"));
    }
}
