//! Background refresher
//!
//! Refreshes the cache on a fixed interval for the lifetime of the server and
//! tells subscribers when new data is available.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::manager::CacheManager;
use super::{DataEvent, Notifier};

/// Default refresh interval
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically refreshes a [`CacheManager`]
pub struct Refresher {
    cache: Arc<CacheManager>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

/// Handle to a running refresher task
///
/// Dropping the handle also stops the task.
pub struct RefresherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefresherHandle {
    /// Signal the task to stop and wait for it to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Sheet refresher task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Refresher {
    pub fn new(cache: Arc<CacheManager>, notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            cache,
            notifier,
            interval,
        }
    }

    /// Run one refresh, notifying subscribers if the snapshot was replaced
    ///
    /// Returns whether new data was published.
    pub async fn tick(&self) -> bool {
        match self.cache.try_refresh().await {
            Ok(snapshot) => {
                self.notifier.publish(DataEvent {
                    member_count: snapshot.len(),
                    last_updated: snapshot.last_updated(),
                });
                true
            }
            // Already logged by the cache; keep serving the old snapshot
            Err(_) => false,
        }
    }

    /// Spawn the background task
    ///
    /// The first refresh happens one interval after start; the initial load is
    /// the cache's lazy bootstrap.
    pub fn start(self) -> RefresherHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            "Starting sheet refresher"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::debug!("Running scheduled sheet refresh");
                        self.tick().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Sheet refresher stopped");
        });

        RefresherHandle { shutdown, task }
    }
}
