//! Member Cache
//!
//! Keeps the last-known-good snapshot of the member sheet in memory.
//!
//! ## Architecture
//!
//! - **CacheManager**: owns the snapshot, refreshes it, bootstraps it lazily
//! - **Refresher**: background task that refreshes on a fixed interval and
//!   notifies subscribers after each successful refresh
//!
//! ## Data Flow
//!
//! 1. The refresher (or the first reader) asks the manager to refresh
//! 2. The manager fetches the grid from its [`DataSource`](crate::sheet::DataSource)
//! 3. On success the normalized records replace the snapshot as a whole
//! 4. On failure the previous snapshot keeps being served

mod manager;
mod refresher;

pub use manager::{CacheManager, CacheStatus, RefreshError, Snapshot, DEFAULT_FETCH_TIMEOUT};
pub use refresher::{Refresher, RefresherHandle, DEFAULT_REFRESH_INTERVAL};

use chrono::{DateTime, Utc};

/// Event emitted after the snapshot has been replaced
#[derive(Debug, Clone, PartialEq)]
pub struct DataEvent {
    /// Number of members in the new snapshot
    pub member_count: usize,
    /// When the snapshot was taken
    pub last_updated: Option<DateTime<Utc>>,
}

/// Receives data-change events; delivery is best effort
pub trait Notifier: Send + Sync {
    fn publish(&self, event: DataEvent);
}
