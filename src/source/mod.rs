//! Transcript sources.
//!
//! A transcript source reads stored JSON objects and pulls the transcript
//! strings out of them. Payloads come in a few shapes: a top-level
//! `transcript` field, a `videos` array whose entries carry transcripts, or
//! a bare array of such entries.

mod fs;

pub use fs::FsTranscriptSource;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One stored object and the transcripts extracted from it.
///
/// Read or parse failures are recorded on the object rather than raised, so
/// one bad object never hides the rest of the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceObject {
    /// Object key relative to the source root.
    pub key: String,
    /// Extracted transcript texts, trimmed and de-duplicated.
    pub transcripts: Vec<String>,
    /// Read or parse failure for this object, if any.
    pub error: Option<String>,
}

/// Where transcript objects come from.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Read objects whose keys start with `prefix`, up to `limit` objects,
    /// in stable key order.
    async fn load_objects(&self, prefix: &str, limit: usize) -> Result<Vec<SourceObject>>;
}

/// One transcript pulled out of a stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Key of the object the transcript came from.
    pub source_id: String,
    /// Position of the transcript within its object, from 0.
    pub index: usize,
    /// The transcript text.
    pub text: String,
}

impl TranscriptRecord {
    /// Stable key joining this transcript to all downstream results.
    pub fn key(&self) -> String {
        transcript_key(&self.source_id, self.index)
    }
}

/// Derive the stable key for one transcript within a source object.
pub fn transcript_key(source_id: &str, index: usize) -> String {
    format!("{}::transcript_{}", source_id, index)
}

/// Split a transcript key back into its source key and transcript index.
pub fn parse_transcript_key(key: &str) -> Option<(&str, usize)> {
    let (source_id, index) = key.rsplit_once("::transcript_")?;
    Some((source_id, index.parse().ok()?))
}

/// Pull every transcript string out of a stored payload.
///
/// Accepts the payload shapes the upstream exporters produce. Each
/// transcript is trimmed; empties are dropped; duplicates keep their first
/// occurrence so ordering stays stable.
pub fn extract_transcripts(payload: &Value) -> Vec<String> {
    let mut transcripts = Vec::new();

    let mut push = |value: Option<&Value>, out: &mut Vec<String>| {
        if let Some(text) = value.and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    };

    if let Some(map) = payload.as_object() {
        push(map.get("transcript"), &mut transcripts);

        if let Some(videos) = map.get("videos").and_then(Value::as_array) {
            for video in videos {
                push(video.get("transcript"), &mut transcripts);
            }
        }
    }

    if let Some(items) = payload.as_array() {
        for item in items {
            push(item.get("transcript"), &mut transcripts);
        }
    }

    let mut seen = HashSet::new();
    transcripts.retain(|t| seen.insert(t.clone()));
    transcripts
}

/// Flatten loaded objects into one record per transcript.
///
/// Objects that failed to load contribute nothing; their error stays on the
/// `SourceObject` for reporting. Transcript indexes count from 0 within
/// each object.
pub fn transcript_records(objects: &[SourceObject]) -> Vec<TranscriptRecord> {
    let mut records = Vec::new();
    for object in objects {
        if object.error.is_some() {
            continue;
        }
        for (index, text) in object.transcripts.iter().enumerate() {
            records.push(TranscriptRecord {
                source_id: object.key.clone(),
                index,
                text: text.clone(),
            });
        }
    }
    records
}

/// Flatten loaded objects into a transcript-key → text map.
pub fn collect_transcripts(objects: &[SourceObject]) -> BTreeMap<String, String> {
    transcript_records(objects)
        .into_iter()
        .map(|record| (record.key(), record.text))
        .collect()
}
