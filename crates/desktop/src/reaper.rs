//! Background pruning of expired suite grants.

use std::sync::Arc;
use std::time::Duration;

use suitegate_auth::AuthorizationStore;
use suitegate_core::{Clock, SuiteId};

/// Callback invoked with the suites removed by a reaper pass.
pub type PruneListener = Box<dyn Fn(&[SuiteId]) + Send + Sync>;

/// Periodically removes expired grants so a tab left open past the TTL does
/// not keep showing a suite as unlocked.
///
/// This is the only component that revokes access without a user action.
pub struct ExpiryReaper {
    store: Arc<AuthorizationStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    listener: Option<PruneListener>,
}

impl ExpiryReaper {
    pub fn new(store: Arc<AuthorizationStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
            listener: None,
        }
    }

    /// Register a callback for passes that removed at least one grant.
    pub fn on_prune<F>(mut self, listener: F) -> Self
    where
        F: Fn(&[SuiteId]) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single pass. Storage is only written if something expired.
    pub fn tick(&self) -> Vec<SuiteId> {
        let removed = self.store.prune_expired(self.clock.now());
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), suites = ?removed, "pruned expired suite grants");
            if let Some(listener) = &self.listener {
                listener(&removed);
            }
        }
        removed
    }

    /// Spawn the reaper on the current tokio runtime.
    ///
    /// The first pass runs immediately; later passes follow `interval`.
    /// Missed ticks are skipped rather than replayed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start(self) -> ReaperHandle {
        let shutdown = Arc::new(tokio::sync::Notify::new());
        let signal = shutdown.clone();

        let join = tokio::spawn(async move {
            tracing::info!(interval = ?self.interval, "expiry reaper started");

            let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = signal.notified() => {
                        tracing::info!("expiry reaper received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.tick();
                    }
                }
            }

            tracing::info!("expiry reaper stopped");
        });

        ReaperHandle { shutdown, join }
    }
}

/// Handle to a running reaper task.
#[cfg(not(target_arch = "wasm32"))]
pub struct ReaperHandle {
    shutdown: Arc<tokio::sync::Notify>,
    join: tokio::task::JoinHandle<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReaperHandle {
    /// Request shutdown and wait for the task to finish.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.join.await {
            tracing::warn!(error = %err, "expiry reaper task ended abnormally");
        }
    }
}
