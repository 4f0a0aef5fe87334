//! Member Routes
//!
//! - GET /api/members - Raw member records
//! - GET /api/status - Cache freshness and refresh health

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::MemberList;
use crate::api::state::AppState;
use crate::cache::CacheStatus;

/// GET /api/members
///
/// Every row of the sheet as a JSON object keyed by header name. Cells a row
/// did not reach are omitted from that object.
pub async fn list_members(State(state): State<Arc<AppState>>) -> Json<MemberList> {
    Json(MemberList(state.get_members().await))
}

/// GET /api/status
///
/// Reports the cached snapshot size and the outcome of recent refreshes.
/// Does not trigger a fetch.
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.cache.status().await)
}
