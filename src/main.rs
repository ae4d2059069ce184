// =============================================================================
// GoldMind Signal Backend — Main Entry Point
// =============================================================================
//
// Receives market snapshots from a trading client, asks a reasoning engine
// for a structured decision, and always answers with a well-formed decision.
// Stateless: every request is served independently on the tokio runtime.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod config;
mod contract;
mod decision_envelope;
mod features;
mod indicators;
mod pipeline;
mod reasoning;
mod safety_gate;
mod types;
mod validator;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::SignalConfig;
use crate::pipeline::SignalPipeline;
use crate::reasoning::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SignalConfig::from_env().context("invalid configuration")?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        GoldMind AI Signal Backend — Starting Up          ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!(model = %config.model, "Reasoning model");
    info!(api_key = %config.key_preview(), "Reasoning credential");
    info!(
        timeout_secs = config.inference_timeout_secs,
        base_url = %config.base_url,
        "Reasoning endpoint"
    );
    if config.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set — every signal will veto with model_unavailable");
    }

    // ── 2. Reasoning engine + pipeline ───────────────────────────────────
    let engine = Arc::new(OpenAiClient::new(&config)?);
    let pipeline = Arc::new(SignalPipeline::new(engine, &config));

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::rest::router(pipeline);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Health:  GET  /health");
    info!(addr = %config.bind_addr, "Signal:  POST /signal");
    info!("Waiting for signal requests...");

    // ── 4. Serve until Ctrl+C ────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Shutdown signal received — stopping gracefully");
            }
        })
        .await
        .context("API server failed")?;

    info!("GoldMind Signal Backend shut down complete.");
    Ok(())
}
