//! Qdrant-backed vector index.
//!
//! Talks to the Qdrant REST API directly. The collection is created on
//! first upsert if it does not exist; searches against a missing
//! collection return no hits.

use super::{Point, SearchHit, VectorIndex};
use crate::config::VectorIndexSettings;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Vector index on a remote Qdrant instance.
pub struct QdrantVectorIndex {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl QdrantVectorIndex {
    pub fn new(settings: &VectorIndexSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            collection: settings.collection.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }
        request
    }

    async fn read_body(response: reqwest::Response, context: &str) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecapError::VectorIndex(format!(
                "{} failed with {}: {}",
                context, status, body
            )));
        }
        Ok(response.json().await?)
    }

    async fn collection_exists(&self) -> Result<bool> {
        let response = self
            .request(reqwest::Method::GET, "/collections")
            .send()
            .await?;
        let body = Self::read_body(response, "listing collections").await?;

        let exists = body["result"]["collections"]
            .as_array()
            .map(|collections| {
                collections
                    .iter()
                    .any(|c| c["name"].as_str() == Some(self.collection.as_str()))
            })
            .unwrap_or(false);

        Ok(exists)
    }

    /// Create the collection if it is missing.
    async fn ensure_collection(&self, vector_size: usize) -> Result<()> {
        if self.collection_exists().await? {
            return Ok(());
        }

        info!(collection = %self.collection, vector_size, "creating Qdrant collection");
        let body = json!({
            "vectors": { "size": vector_size, "distance": "Cosine" }
        });
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}", self.collection),
            )
            .json(&body)
            .send()
            .await?;
        Self::read_body(response, "creating collection").await?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, points: &[Point]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        self.ensure_collection(points[0].vector.len()).await?;

        let body = json!({
            "points": points
                .iter()
                .map(|point| {
                    json!({
                        "id": point.id.to_string(),
                        "vector": point.vector,
                        "payload": point.payload,
                    })
                })
                .collect::<Vec<_>>(),
        });

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", self.collection),
            )
            .json(&body)
            .send()
            .await?;
        Self::read_body(response, "upserting points").await?;

        debug!(points = points.len(), collection = %self.collection, "upserted points");
        Ok(points.len())
    }

    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        if !self.collection_exists().await? {
            return Ok(Vec::new());
        }

        let body = json!({
            "vector": query_vector,
            "limit": limit,
            "with_payload": true,
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", self.collection),
            )
            .json(&body)
            .send()
            .await?;
        let result = Self::read_body(response, "searching points").await?;

        let hits = result["result"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .map(|hit| {
                        let payload = &hit["payload"];
                        SearchHit {
                            id: hit["id"].as_str().unwrap_or_default().to_string(),
                            score: hit["score"].as_f64().unwrap_or_default() as f32,
                            transcript_key: payload["transcript_key"]
                                .as_str()
                                .unwrap_or_default()
                                .to_string(),
                            source_key: payload["source_key"]
                                .as_str()
                                .unwrap_or_default()
                                .to_string(),
                            position: payload["position"].as_u64().unwrap_or_default() as usize,
                            text: payload["text"].as_str().unwrap_or_default().to_string(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(hits)
    }

    async fn point_count(&self) -> Result<usize> {
        if !self.collection_exists().await? {
            return Ok(0);
        }

        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", self.collection),
            )
            .send()
            .await?;
        let body = Self::read_body(response, "reading collection info").await?;
        Ok(body["result"]["points_count"].as_u64().unwrap_or_default() as usize)
    }
}
