//! Data Transfer Objects
//!
//! Response types for the API endpoints that are not core metric types.

use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::cache::Snapshot;

// ============================================
// MEMBER DTOs
// ============================================

/// Serializes a snapshot as a bare JSON array of member records
pub struct MemberList(pub Arc<Snapshot>);

impl Serialize for MemberList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.records())
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: ok, degraded
    pub status: String,
    /// Current server time (ISO 8601)
    pub timestamp: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
    /// Members in the cached snapshot
    pub members_cached: usize,
    /// When the snapshot was last refreshed (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Connected WebSocket dashboards
    pub ws_connections: usize,
}
