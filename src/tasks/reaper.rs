//! Cache Reaper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns the reaper for one cache instance.
///
/// The task wakes every `interval`, takes the cache lock and removes every
/// entry older than the cache TTL. It exits when `shutdown` changes or its
/// sender is dropped, so a cache that goes away takes its reaper with it.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `shared` - State shared with the owning [`crate::cache::Cache`]
/// * `interval` - Period between scans
/// * `shutdown` - Stop signal owned by the cache
pub(crate) fn spawn_reaper(
    runtime: &Handle,
    shared: Arc<Shared>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        debug!("Starting cache reaper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = shared.reap_expired();

                    if removed > 0 {
                        info!("Cache reaper: removed {} expired entries", removed);
                    } else {
                        debug!("Cache reaper: no expired entries found");
                    }
                }
                _ = shutdown.changed() => {
                    debug!("Cache reaper stopping");
                    break;
                }
            }
        }
    })
}
