//! Autonomous periodic trigger.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::service::RefreshService;

/// Runs a default-budget refresh every interval until shut down.
///
/// The first run starts immediately. A run in progress is finished before
/// shutdown takes effect.
pub struct PeriodicTrigger {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PeriodicTrigger {
    /// Spawn the trigger loop on the current runtime.
    pub fn spawn(service: Arc<RefreshService>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let summary = service.run_scheduled().await;
                        debug!("Scheduled run {} finished: {}", summary.run_id, summary.stop_reason);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Periodic trigger stopped");
        });

        info!("Periodic trigger every {}s", interval.as_secs());
        Self { shutdown_tx, join }
    }

    /// Request shutdown without waiting.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Request shutdown and wait for the loop to exit.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}
