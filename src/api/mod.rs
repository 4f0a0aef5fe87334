//! Cohort Pulse REST API
//!
//! HTTP API layer, built with Axum. All data endpoints are read-only and
//! computed from the cached member snapshot.
//!
//! # Endpoints
//!
//! ## Data
//! - `GET /api/overview` - Cohort engagement and outcome summary
//! - `GET /api/members` - Raw member records
//! - `GET /api/correlations` - Per-member engagement vs. outcome points
//! - `GET /api/status` - Cache freshness and refresh health
//!
//! ## Health
//! - `GET /` - Plain-text banner
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - `data-updated` notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use cohort_pulse::api::{serve, AppState};
//! use cohort_pulse::cache::CacheManager;
//! use cohort_pulse::config::ApiConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Arc::new(CacheManager::new(source));
//!     let state = AppState::new(cache, ApiConfig::default());
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::{HeaderValue, Method, Uri},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/overview", get(routes::overview::get_overview))
        .route("/members", get(routes::members::list_members))
        .route("/correlations", get(routes::correlations::get_correlations))
        .route("/status", get(routes::members::cache_status));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/ws", get(websocket_handler))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive CORS unless specific origins are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Cohort Pulse API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Cohort Pulse API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::sheet::testing::{grid, ScriptedSource};
    use crate::sheet::DataSource;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn members_grid() -> Vec<Vec<crate::records::Cell>> {
        grid(&[
            &[
                "MEMBER_ID",
                "7D MEAL LOG %",
                "app usege min 7d",
                "START WEIGHT",
                "LAST WEIGHT",
            ],
            &["m1", "80%", "45", "200", "190"],
            &["m2", "40%", "10"],
        ])
    }

    fn create_test_app(outcomes: Vec<Result<crate::records::RawGrid, String>>) -> Router {
        let source = Arc::new(ScriptedSource::new(outcomes));
        let cache = Arc::new(CacheManager::new(source as Arc<dyn DataSource>));
        build_router(AppState::new(cache, ApiConfig::default()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_banner() {
        let app = create_test_app(vec![]);
        let (status, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Backend is live");
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app(vec![]);
        let (status, _) = get(app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_requires_data() {
        let app = create_test_app(vec![Ok(members_grid())]);

        let (status, _) = get(app.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        // First data read bootstraps the cache
        get(app.clone(), "/api/members").await;

        let (status, _) = get(app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app(vec![]);
        let (status, json) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["members_cached"], 0);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_overview() {
        let app = create_test_app(vec![Ok(members_grid())]);
        let (status, json) = get_json(app, "/api/overview").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalMembers"], 2);
        assert_eq!(json["mealFollowers"], 1);
        assert_eq!(json["mealFollowersPct"], 50);
        assert_eq!(json["activeUsers"], 1);
        assert_eq!(json["activePct"], 50);
        assert_eq!(json["weightImproved"], 1);
        assert_eq!(json["hba1cImproved"], 0);
    }

    #[tokio::test]
    async fn test_overview_with_failing_source() {
        let app = create_test_app(vec![Err("permission denied".to_string())]);
        let (status, json) = get_json(app, "/api/overview").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalMembers"], 0);
        assert_eq!(json["mealFollowersPct"], 0);
    }

    #[tokio::test]
    async fn test_members_keep_short_rows_short() {
        let app = create_test_app(vec![Ok(members_grid())]);
        let (status, json) = get_json(app, "/api/members").await;

        assert_eq!(status, StatusCode::OK);
        let members = json.as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0]["MEMBER_ID"], "m1");
        assert_eq!(members[1].as_object().unwrap().len(), 3);
        assert!(members[1].get("START WEIGHT").is_none());
    }

    #[tokio::test]
    async fn test_correlations() {
        let app = create_test_app(vec![Ok(members_grid())]);
        let (status, json) = get_json(app, "/api/correlations").await;

        assert_eq!(status, StatusCode::OK);
        let points = json.as_array().unwrap();
        assert_eq!(points[0]["memberId"], "m1");
        assert_eq!(points[0]["mealLog7dPct"], 80.0);
        assert_eq!(points[0]["weightChangeLbs"], -10.0);
        assert!(points[1]["weightChangeLbs"].is_null());
        assert!(points[1]["gfy7dPct"].is_null());
    }

    #[tokio::test]
    async fn test_status_does_not_fetch() {
        let app = create_test_app(vec![Ok(members_grid())]);
        let (status, json) = get_json(app, "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["member_count"], 0);
        assert!(json["last_attempt"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_test_app(vec![]);
        let (status, json) = get_json(app, "/api/nothing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_cors_with_explicit_origins() {
        let config = ApiConfig {
            cors_origins: vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()],
            ..ApiConfig::default()
        };
        // Invalid origins are skipped rather than failing router construction
        let _layer = cors_layer(&config);
    }
}
