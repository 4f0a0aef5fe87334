//! Overview Routes
//!
//! - GET /api/overview - Cohort-wide engagement and outcome counts

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::metrics::Overview;

/// GET /api/overview
///
/// Recomputed from the cached snapshot on every request.
pub async fn get_overview(State(state): State<Arc<AppState>>) -> Json<Overview> {
    Json(state.get_overview().await)
}
