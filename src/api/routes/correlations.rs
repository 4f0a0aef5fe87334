//! Correlation Routes
//!
//! - GET /api/correlations - Engagement vs. outcome point per member

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::metrics::CorrelationPoint;

/// GET /api/correlations
///
/// One point per member, in sheet order. Fields that cannot be read as
/// numbers are null.
pub async fn get_correlations(State(state): State<Arc<AppState>>) -> Json<Vec<CorrelationPoint>> {
    Json(state.get_correlations().await)
}
