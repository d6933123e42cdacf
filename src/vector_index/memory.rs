//! In-memory vector index implementation.
//!
//! Useful for testing and for runs without a Qdrant instance.

use super::{cosine_similarity, Point, SearchHit, VectorIndex};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector index keyed by point id.
pub struct MemoryVectorIndex {
    points: RwLock<HashMap<Uuid, Point>>,
}

impl MemoryVectorIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, points: &[Point]) -> Result<usize> {
        let mut store = self.points.write().unwrap();
        for point in points {
            store.insert(point.id, point.clone());
        }
        Ok(points.len())
    }

    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let store = self.points.read().unwrap();

        let mut hits: Vec<SearchHit> = store
            .values()
            .map(|point| SearchHit {
                id: point.id.to_string(),
                score: cosine_similarity(query_vector, &point.vector),
                transcript_key: point.payload.transcript_key.clone(),
                source_key: point.payload.source_key.clone(),
                position: point.payload.position,
                text: point.payload.text.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        Ok(hits)
    }

    async fn point_count(&self) -> Result<usize> {
        Ok(self.points.read().unwrap().len())
    }
}

#[cfg(test)]
mod tests {
    use super::super::PointPayload;
    use super::*;

    fn point(key: &str, position: usize, vector: Vec<f32>) -> Point {
        Point::new(
            vector,
            PointPayload {
                transcript_key: key.to_string(),
                source_key: "src".to_string(),
                transcript_index: 0,
                position,
                text: format!("chunk {}", position),
            },
        )
    }

    #[tokio::test]
    async fn test_upsert_with_same_id_replaces_the_point() {
        let index = MemoryVectorIndex::new();

        index
            .upsert(&[point("k", 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert(&[point("k", 0, vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(index.point_count().await.unwrap(), 1);

        let hits = index.search(&[0.0, 1.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity_and_truncates() {
        let index = MemoryVectorIndex::new();
        index
            .upsert(&[
                point("k", 0, vec![1.0, 0.0]),
                point("k", 1, vec![0.7, 0.7]),
                point("k", 2, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 1);
        assert!(hits[0].score > hits[1].score);
    }
}
