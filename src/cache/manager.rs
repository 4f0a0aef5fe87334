//! Cache Manager
//!
//! Owns the in-memory member snapshot. The snapshot is only ever replaced as
//! a whole (`Arc` swap), so readers see either the old or the new one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::records::{normalize, Record};
use crate::sheet::{DataSource, SheetError};

/// Default upper bound on a single sheet fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// All members as of the last successful refresh
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The snapshot served before any refresh has succeeded
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(records: Vec<Record>, last_updated: DateTime<Utc>) -> Self {
        Self {
            records,
            last_updated: Some(last_updated),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Why a refresh left the snapshot untouched
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Sheet fetch failed: {0}")]
    Fetch(#[from] SheetError),

    #[error("Sheet fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Sheet returned empty data")]
    EmptyGrid,
}

/// Bookkeeping about refresh attempts
#[derive(Debug, Clone, Default)]
struct RefreshState {
    last_attempt: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<String>,
}

/// Point-in-time view of the cache, for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub source: String,
    pub member_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Owns the member snapshot and refreshes it from a data source
pub struct CacheManager {
    source: Arc<dyn DataSource>,
    snapshot: RwLock<Arc<Snapshot>>,
    state: RwLock<RefreshState>,
    /// Serializes lazy bootstrap fetches
    bootstrap: Mutex<()>,
    /// Completed refresh attempts, successful or not
    attempts: AtomicU64,
    fetch_timeout: Duration,
}

impl CacheManager {
    /// Create a cache with an empty snapshot
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            state: RwLock::new(RefreshState::default()),
            bootstrap: Mutex::new(()),
            attempts: AtomicU64::new(0),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Set the upper bound on a single fetch
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The snapshot currently being served, without fetching
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Refresh from the data source, falling back to the cached snapshot
    ///
    /// Never fails: fetch errors, timeouts and empty sheets are logged and the
    /// existing (possibly empty) snapshot is returned unchanged.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        match self.try_refresh().await {
            Ok(snapshot) => snapshot,
            Err(_) => self.current().await,
        }
    }

    /// Refresh from the data source, reporting whether the snapshot changed
    pub async fn try_refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let start = Instant::now();
        let attempted_at = Utc::now();

        let fetched = match tokio::time::timeout(self.fetch_timeout, self.source.fetch_grid()).await
        {
            Ok(Ok(grid)) if grid.is_empty() => Err(RefreshError::EmptyGrid),
            Ok(Ok(grid)) => Ok(grid),
            Ok(Err(e)) => Err(RefreshError::from(e)),
            Err(_) => Err(RefreshError::Timeout(self.fetch_timeout)),
        };

        let result = match fetched {
            Ok(grid) => {
                let snapshot = Arc::new(Snapshot::new(normalize(grid), Utc::now()));
                *self.snapshot.write().await = Arc::clone(&snapshot);

                let mut state = self.state.write().await;
                state.last_attempt = Some(attempted_at);
                state.consecutive_failures = 0;
                state.last_error = None;

                tracing::info!(
                    source = %self.source.name(),
                    members = snapshot.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Sheet refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                let cached = self.snapshot.read().await.len();

                let mut state = self.state.write().await;
                state.last_attempt = Some(attempted_at);
                state.consecutive_failures += 1;
                state.last_error = Some(e.to_string());

                tracing::warn!(
                    source = %self.source.name(),
                    error = %e,
                    cached_members = cached,
                    consecutive_failures = state.consecutive_failures,
                    "Sheet refresh failed, serving cached data"
                );
                Err(e)
            }
        };

        // Bumped only once the outcome is visible, so bootstrap waiters that
        // observe the new count also observe the new snapshot.
        self.attempts.fetch_add(1, Ordering::SeqCst);
        result
    }

    /// Get the snapshot, bootstrapping it with one refresh if still empty
    ///
    /// Callers that arrive while a bootstrap fetch is in flight wait for it
    /// and share its outcome instead of issuing their own fetch.
    pub async fn get_data(&self) -> Arc<Snapshot> {
        let seen = self.attempts.load(Ordering::SeqCst);

        let current = self.current().await;
        if !current.is_empty() {
            return current;
        }

        let _guard = self.bootstrap.lock().await;
        if self.attempts.load(Ordering::SeqCst) != seen {
            return self.current().await;
        }

        tracing::debug!("Cache empty, bootstrapping from source");
        self.refresh().await
    }

    /// Run the lazy bootstrap on a background task
    ///
    /// Returns immediately. Readers that arrive before it completes share
    /// its fetch through [`get_data`](Self::get_data).
    pub fn spawn_warm_up(self: &Arc<Self>) -> JoinHandle<Arc<Snapshot>> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let snapshot = cache.get_data().await;
            if snapshot.is_empty() {
                tracing::warn!(
                    "Initial load returned no members, serving empty data until a refresh succeeds"
                );
            } else {
                tracing::info!(members = snapshot.len(), "Initial data load complete");
            }
            snapshot
        })
    }

    /// Current cache status
    pub async fn status(&self) -> CacheStatus {
        let snapshot = self.current().await;
        let state = self.state.read().await.clone();

        CacheStatus {
            source: self.source.name().to_string(),
            member_count: snapshot.len(),
            last_updated: snapshot.last_updated(),
            last_attempt: state.last_attempt,
            consecutive_failures: state.consecutive_failures,
            last_error: state.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Cell;
    use crate::sheet::testing::{grid, ScriptedSource};

    fn members_grid() -> Vec<Vec<Cell>> {
        grid(&[
            &["MEMBER_ID", "7D MEAL LOG %"],
            &["m1", "80%"],
            &["m2", "40%"],
        ])
    }

    fn cache_with(source: Arc<ScriptedSource>) -> CacheManager {
        CacheManager::new(source as Arc<dyn DataSource>)
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let cache = cache_with(Arc::clone(&source));

        let snapshot = cache.current().await;
        assert!(snapshot.is_empty());
        assert!(snapshot.last_updated().is_none());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(members_grid()),
            Err("permission denied".to_string()),
        ]));
        let cache = cache_with(Arc::clone(&source));

        let first = cache.refresh().await;
        assert_eq!(first.len(), 2);

        let after_failure = cache.refresh().await;
        assert!(Arc::ptr_eq(&first, &after_failure));

        let served = cache.get_data().await;
        assert!(Arc::ptr_eq(&first, &served));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_grid_keeps_previous_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(members_grid()), Ok(vec![])]));
        let cache = cache_with(Arc::clone(&source));

        cache.refresh().await;
        let err = cache.try_refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::EmptyGrid));
        assert_eq!(cache.current().await.len(), 2);
    }

    #[tokio::test]
    async fn test_lazy_bootstrap_fetches_once() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(members_grid())]));
        let cache = cache_with(Arc::clone(&source));

        let snapshot = cache.get_data().await;
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.last_updated().is_some());
        assert_eq!(source.calls(), 1);

        // Non-empty snapshot is served without fetching again
        cache.get_data().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_bootstrap_returns_empty() {
        let source = Arc::new(ScriptedSource::new(vec![Err("offline".to_string())]));
        let cache = cache_with(Arc::clone(&source));

        let snapshot = cache.get_data().await;
        assert!(snapshot.is_empty());
        assert_eq!(source.calls(), 1);

        // Still empty, so the next reader tries again
        cache.get_data().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_bootstrap_is_coalesced() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(members_grid())]).with_delay(Duration::from_millis(50)),
        );
        let cache = Arc::new(cache_with(Arc::clone(&source)));

        let (a, b, c) = tokio::join!(cache.get_data(), cache.get_data(), cache.get_data());

        assert_eq!(source.calls(), 1);
        assert_eq!(a.len(), 2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn test_warm_up_runs_in_background() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(members_grid())]).with_delay(Duration::from_millis(100)),
        );
        let cache = Arc::new(cache_with(Arc::clone(&source)));

        let started = Instant::now();
        let warm_up = cache.spawn_warm_up();
        assert!(started.elapsed() < Duration::from_millis(50));
        assert!(cache.current().await.is_empty());

        // A reader arriving mid warm-up joins the same fetch
        let snapshot = cache.get_data().await;
        let warmed = warm_up.await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot, &warmed));
    }

    #[tokio::test]
    async fn test_fetch_timeout_counts_as_failure() {
        let source = Arc::new(
            ScriptedSource::new(vec![Ok(members_grid())]).with_delay(Duration::from_millis(200)),
        );
        let cache = cache_with(Arc::clone(&source)).with_fetch_timeout(Duration::from_millis(20));

        let err = cache.try_refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Timeout(_)));

        let status = cache.status().await;
        assert_eq!(status.member_count, 0);
        assert_eq!(status.consecutive_failures, 1);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_status_resets_after_success() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err("offline".to_string()),
            Err("offline".to_string()),
            Ok(members_grid()),
        ]));
        let cache = cache_with(Arc::clone(&source));

        cache.refresh().await;
        cache.refresh().await;
        assert_eq!(cache.status().await.consecutive_failures, 2);

        cache.refresh().await;
        let status = cache.status().await;
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.member_count, 2);
        assert_eq!(status.source, "scripted");
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn test_header_only_grid_replaces_with_empty() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(members_grid()),
            Ok(grid(&[&["MEMBER_ID", "7D MEAL LOG %"]])),
        ]));
        let cache = cache_with(Arc::clone(&source));

        cache.refresh().await;
        let snapshot = cache.try_refresh().await.unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.last_updated().is_some());
    }
}
