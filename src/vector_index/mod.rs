//! Vector index abstraction for chunk embeddings.
//!
//! Provides a trait-based interface over the index backends: a Qdrant
//! instance for real deployments and an in-memory index for tests and
//! offline runs.

mod memory;
mod qdrant;

pub use memory::MemoryVectorIndex;
pub use qdrant::QdrantVectorIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload stored alongside each chunk vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointPayload {
    /// Key of the transcript the chunk belongs to.
    pub transcript_key: String,
    /// Key of the source object the transcript came from.
    pub source_key: String,
    /// Index of the transcript within its source object.
    pub transcript_index: usize,
    /// Chunk order within the transcript, from 0.
    pub position: usize,
    /// The chunk text itself.
    pub text: String,
}

/// One indexed chunk vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

impl Point {
    /// Build a point carrying the deterministic id for its chunk.
    pub fn new(vector: Vec<f32>, payload: PointPayload) -> Self {
        let id = point_id(&payload.transcript_key, payload.position);
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// Deterministic point id for a chunk.
///
/// Re-running the pipeline over the same transcript produces the same ids,
/// so upserts replace stale points instead of accumulating duplicates.
pub fn point_id(transcript_key: &str, position: usize) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{}:{}", transcript_key, position).as_bytes(),
    )
}

/// A search hit with its similarity score (higher is closer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub transcript_key: String,
    pub source_key: String,
    pub position: usize,
    pub text: String,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Write points, replacing any with the same id. Returns how many were written.
    async fn upsert(&self, points: &[Point]) -> Result<usize>;

    /// Find the indexed chunks nearest to a query vector.
    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>>;

    /// Get total indexed point count.
    async fn point_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_point_id_is_deterministic() {
        let first = point_id("vidA::transcript_0", 0);
        let second = point_id("vidA::transcript_0", 0);
        assert_eq!(first, second);

        assert_ne!(first, point_id("vidA::transcript_0", 1));
        assert_ne!(first, point_id("vidB::transcript_0", 0));
    }

    #[test]
    fn test_point_new_derives_id_from_payload() {
        let payload = PointPayload {
            transcript_key: "vidA::transcript_0".to_string(),
            source_key: "vidA".to_string(),
            transcript_index: 0,
            position: 3,
            text: "chunk text".to_string(),
        };
        let point = Point::new(vec![0.1, 0.2], payload);
        assert_eq!(point.id, point_id("vidA::transcript_0", 3));
    }
}
