//! Cache Store Module
//!
//! Main cache engine: a mutex-guarded HashMap with age-based logical expiry
//! and a background reaper for physical removal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::error::{Error, Result};
use crate::tasks::spawn_reaper;

// == Shared State ==
/// Everything guarded by the cache's single lock.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// State shared between the cache handle and its reaper task.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl Shared {
    fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
        }
    }

    /// Locks the state. A panic while holding the lock cannot leave the map
    /// half-written (every critical section is a single map operation), so a
    /// poisoned lock is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Reap Expired ==
    /// Physically removes every entry older than the TTL.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn reap_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut state = self.lock();

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - state.entries.len();

        state.stats.record_reaped(removed);
        removed
    }
}

// == Cache ==
/// Thread-safe TTL cache mapping request URLs to response bodies.
///
/// Every entry becomes invisible to [`Cache::get`] once its age exceeds the
/// TTL. A reaper task, started by the constructor, physically removes
/// expired entries every `reap_interval`. The reaper stops when
/// [`Cache::shutdown`] is called or the cache is dropped.
#[derive(Debug)]
pub struct Cache {
    shared: Arc<Shared>,
    reap_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache whose reaper runs once per `ttl`.
    ///
    /// With this period an entry may stay in memory for up to `2 * ttl`
    /// after creation; reads stop seeing it after `ttl`.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if `ttl` is zero
    /// - [`Error::NoRuntime`] if called outside a Tokio runtime
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_reap_interval(ttl, ttl)
    }

    /// Creates a cache with an explicit reaper period.
    ///
    /// A shorter `reap_interval` tightens the memory bound to
    /// `ttl + reap_interval` at the cost of more frequent scans.
    pub fn with_reap_interval(ttl: Duration, reap_interval: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(Error::InvalidConfig("cache ttl must be positive".to_string()));
        }
        if reap_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "reap interval must be positive".to_string(),
            ));
        }

        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let shared = Arc::new(Shared::new(ttl));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reaper = spawn_reaper(&runtime, shared.clone(), reap_interval, shutdown_rx);

        Ok(Self {
            shared,
            reap_interval,
            shutdown_tx,
            reaper: Mutex::new(Some(reaper)),
        })
    }

    // == Add ==
    /// Inserts or overwrites the entry for `key`, stamped with the current
    /// instant.
    pub fn add(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let entry = CacheEntry::new(value.into());

        let mut state = self.shared.lock();
        state.entries.insert(key, entry);
    }

    // == Get ==
    /// Returns a copy of the value stored under `key`, or `None` when the key
    /// is absent or its entry is older than the TTL.
    ///
    /// Expired entries are left in place; removal is the reaper's job.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let ttl = self.shared.ttl;
        let mut state = self.shared.lock();

        let value = match state.entries.get(key) {
            Some(entry) if !entry.is_expired(ttl) => Some(entry.value.clone()),
            _ => None,
        };

        if value.is_some() {
            state.stats.record_hit();
        } else {
            state.stats.record_miss();
        }
        value
    }

    // == Length ==
    /// Number of physically stored entries, including expired entries the
    /// reaper has not yet removed.
    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored, expired or not.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().entries.is_empty()
    }

    // == TTL ==
    /// Returns the entry time-to-live fixed at construction.
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    // == Reap Interval ==
    /// Returns the period between reaper scans.
    pub fn reap_interval(&self) -> Duration {
        self.reap_interval
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Reaper Status ==
    /// Returns true while the reaper task is alive.
    pub fn is_reaper_running(&self) -> bool {
        self.reaper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit.
    ///
    /// Entries already stored stay readable. Calling this more than once is
    /// a no-op.
    ///
    /// # Errors
    /// [`Error::ReaperFailed`] if the reaper task panicked or was cancelled.
    pub async fn shutdown(&self) -> Result<()> {
        let handle = self
            .reaper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            debug!("Cache reaper already stopped");
            return Ok(());
        };

        // The receiver is gone only if the reaper already exited
        let _ = self.shutdown_tx.send(true);

        handle.await.map_err(|err| {
            warn!("Cache reaper ended abnormally: {}", err);
            Error::ReaperFailed(err.to_string())
        })
    }
}
