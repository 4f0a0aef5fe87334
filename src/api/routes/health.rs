//! Health Routes
//!
//! Health check endpoints for monitoring and container probes.
//!
//! - GET / - Plain-text banner
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (member data is loaded)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /
pub async fn root() -> &'static str {
    "Backend is live"
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once a non-empty snapshot is cached. Does not fetch.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.cache.current().await.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health
///
/// Full health status. Reports `degraded` while the cache is empty or the
/// most recent refresh failed; the service still answers in that state.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.cache.status().await;

    let overall_status = if status.member_count > 0 && status.consecutive_failures == 0 {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: overall_status.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        members_cached: status.member_count,
        last_updated: status.last_updated.map(|t| t.to_rfc3339()),
        ws_connections: state.ws_connection_count().await,
    })
}
