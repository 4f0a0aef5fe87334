//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheManager, Snapshot};
use crate::config::ApiConfig;
use crate::metrics::{build_correlation_data, calculate_overview, CorrelationPoint, Overview};
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Member cache; every read goes through its lazy bootstrap
    pub cache: Arc<CacheManager>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for data-updated notifications
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create state with a default WebSocket hub
    pub fn new(cache: Arc<CacheManager>, config: ApiConfig) -> Self {
        Self::with_hub(cache, config, Arc::new(ConnectionHub::new(HubConfig::default())))
    }

    /// Create state sharing an existing hub (the refresher publishes to it)
    pub fn with_hub(cache: Arc<CacheManager>, config: ApiConfig, ws_hub: Arc<ConnectionHub>) -> Self {
        Self {
            cache,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub,
        }
    }

    /// Cohort overview computed from the current snapshot
    pub async fn get_overview(&self) -> Overview {
        let snapshot = self.cache.get_data().await;
        calculate_overview(snapshot.records())
    }

    /// All member records as of the last successful refresh
    pub async fn get_members(&self) -> Arc<Snapshot> {
        self.cache.get_data().await
    }

    /// Per-member correlation points computed from the current snapshot
    pub async fn get_correlations(&self) -> Vec<CorrelationPoint> {
        let snapshot = self.cache.get_data().await;
        build_correlation_data(snapshot.records())
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
