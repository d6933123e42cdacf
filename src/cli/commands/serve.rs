//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for pipeline runs and chunk search.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, TranscriptAnalysisResult};
use crate::source::FsTranscriptSource;
use crate::vector_index::SearchHit;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Largest object limit one API-triggered run may request.
const MAX_RUN_LIMIT: usize = 50;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    source: FsTranscriptSource,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let source = FsTranscriptSource::new(settings.data_dir());
    let orchestrator = Orchestrator::new(settings.clone())?;

    let state = Arc::new(AppState {
        orchestrator,
        source,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/pipeline/run", post(run_pipeline))
        .route("/api/pipeline/search", post(search))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Run Pipeline", "POST /api/pipeline/run");
    Output::kv("Search Chunks", "POST /api/pipeline/search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct RunRequest {
    /// Key prefix to process; falls back to the configured default
    #[serde(default)]
    prefix: Option<String>,
    /// Object limit; clamped to 1..=50
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct RunResponse {
    prefix: String,
    object_limit: usize,
    objects_processed: usize,
    transcripts_found: usize,
    succeeded: usize,
    partial: usize,
    failed: usize,
    results: BTreeMap<String, TranscriptAnalysisResult>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SearchResponse {
    collection: String,
    query: String,
    limit: usize,
    hits: Vec<SearchHit>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> impl IntoResponse {
    let prefix = req
        .prefix
        .unwrap_or_else(|| state.settings.source.prefix.clone());
    let limit = req
        .limit
        .unwrap_or(state.settings.source.object_limit)
        .clamp(1, MAX_RUN_LIMIT);

    match state
        .orchestrator
        .run_from_source(&state.source, &prefix, limit)
        .await
    {
        Ok(summary) => Json(RunResponse {
            prefix: summary.prefix,
            object_limit: summary.object_limit,
            objects_processed: summary.objects_processed,
            transcripts_found: summary.transcripts_found,
            succeeded: summary.run.succeeded,
            partial: summary.run.partial,
            failed: summary.run.failed,
            results: summary.run.results,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let query_vector = match state.orchestrator.embedder().embed(&req.query).await {
        Ok(vector) => vector,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    match state
        .orchestrator
        .vector_index()
        .search(&query_vector, req.limit)
        .await
    {
        Ok(hits) => Json(SearchResponse {
            collection: state.settings.vector_index.collection.clone(),
            query: req.query,
            limit: req.limit,
            hits,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
