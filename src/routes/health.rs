use std::time::Instant;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct DatabaseHealth {
    connected: bool,
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
}

/// `GET /health`: liveness probe, never touches the database.
pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `GET /api/v1/health`: includes database connectivity and ping latency.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(detailed_health))
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn detailed_health(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let database = match state.db.ping().await {
        Ok(()) => DatabaseHealth {
            connected: true,
            latency_ms: Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
        },
        Err(err) => {
            tracing::warn!("Database ping failed: {err}");
            DatabaseHealth {
                connected: false,
                latency_ms: None,
            }
        }
    };

    Json(DetailedHealthResponse {
        status: if database.connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
