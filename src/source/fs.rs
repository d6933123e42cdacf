//! Filesystem-backed transcript source.
//!
//! Treats a directory tree as an object store: every regular file is one
//! object, keyed by its path relative to the root.

use super::{extract_transcripts, SourceObject, TranscriptSource};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Reads transcript objects from a local directory.
pub struct FsTranscriptSource {
    root: PathBuf,
}

impl FsTranscriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Collect object keys under the root, sorted for stable runs.
    fn collect_keys(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(RecapError::Source(format!(
                "transcript directory not found: {}",
                self.root.display()
            )));
        }

        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative.to_string_lossy().into_owned();
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl TranscriptSource for FsTranscriptSource {
    async fn load_objects(&self, prefix: &str, limit: usize) -> Result<Vec<SourceObject>> {
        let mut keys = self.collect_keys(prefix)?;
        keys.truncate(limit);
        debug!(objects = keys.len(), prefix, "listed transcript objects");

        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            let path = self.root.join(&key);
            let object = match tokio::fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<Value>(&content) {
                    Ok(payload) => SourceObject {
                        key,
                        transcripts: extract_transcripts(&payload),
                        error: None,
                    },
                    Err(e) => SourceObject {
                        key,
                        transcripts: Vec::new(),
                        error: Some(format!("invalid JSON: {}", e)),
                    },
                },
                Err(e) => SourceObject {
                    key,
                    transcripts: Vec::new(),
                    error: Some(format!("read failed: {}", e)),
                },
            };
            objects.push(object);
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &std::path::Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_loads_objects_in_sorted_key_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.json", r#"{"transcript": "bee"}"#);
        write_file(dir.path(), "a.json", r#"{"transcript": "ay"}"#);
        write_file(dir.path(), "nested/c.json", r#"{"transcript": "sea"}"#);

        let source = FsTranscriptSource::new(dir.path());
        let objects = source.load_objects("", 10).await.unwrap();

        let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.json", "b.json", "nested/c.json"]);
        assert_eq!(objects[0].transcripts, vec!["ay"]);
    }

    #[tokio::test]
    async fn test_prefix_filter_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "talks/one.json", r#"{"transcript": "1"}"#);
        write_file(dir.path(), "talks/two.json", r#"{"transcript": "2"}"#);
        write_file(dir.path(), "other/three.json", r#"{"transcript": "3"}"#);

        let source = FsTranscriptSource::new(dir.path());

        let talks = source.load_objects("talks/", 10).await.unwrap();
        assert_eq!(talks.len(), 2);

        let limited = source.load_objects("", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].key, "other/three.json");
    }

    #[tokio::test]
    async fn test_invalid_json_recorded_per_object() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.json", r#"{"transcript": "fine"}"#);
        write_file(dir.path(), "bad.json", "{not json");

        let source = FsTranscriptSource::new(dir.path());
        let objects = source.load_objects("", 10).await.unwrap();

        assert_eq!(objects.len(), 2);
        let bad = objects.iter().find(|o| o.key == "bad.json").unwrap();
        assert!(bad.error.as_deref().unwrap().contains("invalid JSON"));
        assert!(bad.transcripts.is_empty());

        let good = objects.iter().find(|o| o.key == "good.json").unwrap();
        assert!(good.error.is_none());
        assert_eq!(good.transcripts, vec!["fine"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let source = FsTranscriptSource::new("/definitely/not/a/real/dir");
        let err = source.load_objects("", 10).await.unwrap_err();
        assert!(matches!(err, RecapError::Source(_)));
    }
}
