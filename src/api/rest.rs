// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /health  liveness check, always {"status":"ok"}
//   POST /signal  MarketSnapshot -> TradingDecision
//
// `/signal` answers 200 for every business outcome, vetoes included. Only a
// body that cannot be decoded as a MarketSnapshot is rejected by the
// extractor before the pipeline runs.
//
// CORS is configured permissively; the trading client is usually local.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::SignalPipeline;
use crate::types::MarketSnapshot;

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST router with CORS middleware and the shared pipeline.
pub fn router(pipeline: Arc<SignalPipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/signal", post(signal))
        .layer(cors)
        .with_state(pipeline)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Signal
// =============================================================================

async fn signal(
    State(pipeline): State<Arc<SignalPipeline>>,
    Json(snapshot): Json<MarketSnapshot>,
) -> impl IntoResponse {
    Json(pipeline.generate(&snapshot).await)
}

// =============================================================================
// Tests
// =============================================================================
