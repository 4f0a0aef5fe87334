//! # Cohort Pulse
//!
//! Cohort engagement dashboard backend. Polls a member spreadsheet, keeps the
//! last good copy in memory and serves derived metrics over HTTP, with
//! WebSocket notifications whenever the data changes.
//!
//! ## Features
//!
//! - **Resilient cache**: a failed refresh never discards the last good snapshot
//! - **Lazy bootstrap**: the first reader fetches once, concurrent readers wait
//! - **Derived metrics**: cohort overview and per-member correlation points
//! - **Real-time**: `data-updated` events pushed to connected dashboards
//!
//! ## Modules
//!
//! - [`records`]: header-keyed member records built from the raw grid
//! - [`metrics`]: lenient numeric coercion, overview and correlations
//! - [`sheet`]: Google Sheets values client behind the [`sheet::DataSource`] seam
//! - [`cache`]: snapshot cache and periodic refresher
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: notification hub and socket handler
//! - [`logging`]: `tracing-subscriber` setup for the binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cohort_pulse::cache::CacheManager;
//! use cohort_pulse::config::SheetConfig;
//! use cohort_pulse::sheet::{Credentials, SheetsClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SheetConfig {
//!         spreadsheet_id: "1AbC".to_string(),
//!         ..Default::default()
//!     };
//!     let client = SheetsClient::new(config, Credentials::ApiKey("key".to_string()))?;
//!     let cache = CacheManager::new(Arc::new(client));
//!
//!     let snapshot = cache.get_data().await;
//!     let overview = cohort_pulse::metrics::calculate_overview(snapshot.records());
//!     println!("{} members", overview.total_members);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod records;
pub mod sheet;
pub mod websocket;

// Re-export top-level types for convenience
pub use records::{normalize, Cell, RawGrid, Record};

pub use metrics::{
    build_correlation_data, calculate_overview, to_number, to_percent, CorrelationPoint, Overview,
};

pub use sheet::{Credentials, CredentialsError, DataSource, SheetError, SheetsClient};

pub use cache::{
    CacheManager, CacheStatus, DataEvent, Notifier, RefreshError, Refresher, RefresherHandle,
    Snapshot,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage,
};

pub use config::{
    ApiConfig, Config, ConfigError, LoggingConfig, RefreshConfig, SheetConfig, WebSocketConfig,
};
