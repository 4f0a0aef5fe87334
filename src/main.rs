//! Cohort Pulse API Server
//!
//! Run with: cargo run --bin cohort-pulse
//!
//! # Configuration
//!
//! Settings come from a TOML file (see `cohort-pulse-cli config`) with
//! environment overrides:
//! - `SPREADSHEET_ID`: Spreadsheet to poll (required)
//! - `SHEET_RANGE`: Range in A1 notation (default: Sheet1)
//! - `GOOGLE_CREDENTIALS`: Inline credentials JSON (default: read credentials file)
//! - `PORT`: Port to listen on (default: 3000)
//! - `COHORT_PULSE_HOST`: Host to bind to (default: 0.0.0.0)
//! - `COHORT_PULSE_REFRESH_SECS`: Refresh interval (default: 60)
//! - `COHORT_PULSE_LOG_LEVEL` / `COHORT_PULSE_LOG_FORMAT`: Logging (info, pretty)
//! - `COHORT_PULSE_CONFIG`: Config file path
//! - `RUST_LOG`: Full filter directive, overrides the log level

use anyhow::Context;
use cohort_pulse::api::{serve, AppState};
use cohort_pulse::cache::{CacheManager, Notifier, Refresher};
use cohort_pulse::config::Config;
use cohort_pulse::logging::{init_tracing, with_startup_logging};
use cohort_pulse::sheet::{Credentials, SheetsClient};
use cohort_pulse::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        with_startup_logging(|| Config::load_default(None)).context("loading configuration")?;
    init_tracing(&config.logging);

    tracing::info!("Starting Cohort Pulse v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let credentials = Credentials::load(&config.sheet.credentials_file)
        .context("loading Google credentials")?;
    tracing::info!(
        spreadsheet_id = %config.sheet.spreadsheet_id,
        range = %config.sheet.range,
        "Sheet source configured"
    );

    let client = SheetsClient::new(config.sheet.clone(), credentials)?;
    let cache = Arc::new(
        CacheManager::new(Arc::new(client)).with_fetch_timeout(config.refresh.fetch_timeout()),
    );

    let hub = Arc::new(ConnectionHub::new(HubConfig {
        max_connections: config.websocket.max_connections,
    }));

    // Readiness reports 503 until the warm-up lands
    let warm_up = cache.spawn_warm_up();

    let refresher = Refresher::new(
        Arc::clone(&cache),
        Arc::clone(&hub) as Arc<dyn Notifier>,
        config.refresh.interval(),
    )
    .start();

    let state = AppState::with_hub(cache, config.api.clone(), hub);
    serve(state).await?;

    warm_up.abort();
    tracing::info!("Stopping background refresh...");
    refresher.stop().await;
    tracing::info!("Cohort Pulse stopped");

    Ok(())
}
