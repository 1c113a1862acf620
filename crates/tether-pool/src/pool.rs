//! Keyed handle pool with LRU eviction and TTL reaping.

use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::factory::{EvictionReason, HandleFactory};
use crate::key::PoolKey;
use crate::reaper::Reaper;

/// One pooled handle and its access bookkeeping.
struct Entry<H> {
    handle: Arc<H>,
    last_access: Instant,
}

/// State shared by every clone of a pool and, weakly, by its reaper.
pub(crate) struct PoolState<F: HandleFactory> {
    /// Entries in recency order. Every access promotes, so the LRU end is
    /// always the entry with the oldest `last_access`.
    entries: Mutex<LruCache<PoolKey, Entry<F::Handle>>>,

    factory: F,

    config: PoolConfig,

    reaper: parking_lot::Mutex<Option<Reaper>>,
}

impl<F: HandleFactory> PoolState<F> {
    /// Remove every entry idle for longer than the TTL.
    pub(crate) async fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let ttl = self.config.ttl;

        let expired: Vec<PoolKey> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_access) > ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = entries.pop(key) {
                info!(key = %key, "Evicted expired handle");
                self.factory
                    .on_evict(key, &entry.handle, EvictionReason::Expired);
            }
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), remaining = entries.len(), "Sweep complete");
        }

        expired.len()
    }
}

impl<F: HandleFactory> Drop for PoolState<F> {
    fn drop(&mut self) {
        if let Some(reaper) = self.reaper.get_mut().take() {
            reaper.cancel();
        }
    }
}

/// A pool holding at most one live handle per [`PoolKey`].
///
/// Handles are built lazily by the [`HandleFactory`], reused while they stay
/// in the pool, evicted least-recently-used first when the pool is full, and
/// reaped by a background task once idle for longer than the TTL.
///
/// Every operation on the entry map, including handle construction, runs
/// under one async lock. Two callers can therefore never build a handle for
/// the same key twice, at the cost of serialising construction across keys.
///
/// Clones share the same entries and reaper.
pub struct KeyedPool<F: HandleFactory> {
    state: Arc<PoolState<F>>,
}

impl<F: HandleFactory> KeyedPool<F> {
    /// Create an empty pool. The reaper does not run until [`start`](Self::start).
    pub fn new(config: PoolConfig, factory: F) -> Self {
        Self {
            state: Arc::new(PoolState {
                entries: Mutex::new(LruCache::unbounded()),
                factory,
                config,
                reaper: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.state.config
    }

    /// Get the handle factory.
    pub fn factory(&self) -> &F {
        &self.state.factory
    }

    /// Start the background reaper on the current tokio runtime.
    ///
    /// The pool owns a single reaper: if one is already running this logs a
    /// warning and returns without spawning another.
    pub fn start(&self) {
        let mut slot = self.state.reaper.lock();
        if slot.as_ref().is_some_and(|reaper| !reaper.is_finished()) {
            warn!("Pool reaper already running, ignoring start");
            return;
        }

        *slot = Some(Reaper::spawn(
            Arc::downgrade(&self.state),
            self.state.config.sweep_interval,
        ));

        info!(
            ttl_secs = self.state.config.ttl.as_secs(),
            max_entries = self.state.config.max_entries,
            sweep_interval_secs = self.state.config.sweep_interval.as_secs(),
            "Pool started"
        );
    }

    /// Stop the reaper and drop every entry.
    ///
    /// Safe to call without a prior `start`. Each dropped handle is reported to
    /// [`HandleFactory::on_evict`] with [`EvictionReason::Cleared`].
    pub async fn stop(&self) {
        let reaper = self.state.reaper.lock().take();
        if let Some(reaper) = reaper {
            reaper.shutdown().await;
        }

        let mut entries = self.state.entries.lock().await;
        let count = entries.len();
        while let Some((key, entry)) = entries.pop_lru() {
            self.state
                .factory
                .on_evict(&key, &entry.handle, EvictionReason::Cleared);
        }

        info!(cleared = count, "Pool stopped, all handles cleared");
    }

    /// Whether the background reaper is currently running.
    pub fn is_running(&self) -> bool {
        self.state
            .reaper
            .lock()
            .as_ref()
            .is_some_and(|reaper| !reaper.is_finished())
    }

    /// Get or create the handle for a session and provider.
    pub async fn get(&self, session_id: &str, provider: &str) -> Result<Arc<F::Handle>> {
        self.get_key(&PoolKey::new(session_id, provider)).await
    }

    /// Get or create the handle for `key`.
    ///
    /// A pooled handle is returned as-is with its access time refreshed; the
    /// factory is not called. Otherwise the factory builds a new handle, the
    /// least recently used entry is evicted if the pool is full, and the new
    /// handle is inserted. A factory error is returned without touching the
    /// pool.
    pub async fn get_key(&self, key: &PoolKey) -> Result<Arc<F::Handle>> {
        let state = &self.state;
        let mut entries = state.entries.lock().await;

        if let Some(entry) = entries.get_mut(key) {
            entry.last_access = Instant::now();
            trace!(key = %key, "Reusing pooled handle");
            return Ok(Arc::clone(&entry.handle));
        }

        let handle = match state.factory.create(key).await {
            Ok(handle) => Arc::new(handle),
            Err(source) => {
                warn!(key = %key, error = %source, "Handle construction failed");
                return Err(Error::Construction {
                    key: key.clone(),
                    source,
                });
            }
        };

        if entries.len() >= state.config.max_entries {
            if let Some((evicted_key, evicted)) = entries.pop_lru() {
                info!(key = %evicted_key, "Evicted least recently used handle (capacity limit)");
                state
                    .factory
                    .on_evict(&evicted_key, &evicted.handle, EvictionReason::Capacity);
            }
        }

        entries.put(
            key.clone(),
            Entry {
                handle: Arc::clone(&handle),
                last_access: Instant::now(),
            },
        );

        info!(key = %key, pool_size = entries.len(), "Created new handle");
        Ok(handle)
    }

    /// Remove the handle for a session and provider.
    ///
    /// Returns whether a handle was removed. Removing an absent key is a no-op.
    pub async fn remove(&self, session_id: &str, provider: &str) -> bool {
        self.remove_key(&PoolKey::new(session_id, provider)).await
    }

    /// Remove the handle for `key`, regardless of its age.
    pub async fn remove_key(&self, key: &PoolKey) -> bool {
        let mut entries = self.state.entries.lock().await;
        match entries.pop(key) {
            Some(entry) => {
                info!(key = %key, "Manually removed handle");
                self.state
                    .factory
                    .on_evict(key, &entry.handle, EvictionReason::Removed);
                true
            }
            None => false,
        }
    }

    /// Check whether a handle is pooled, without refreshing its access time.
    pub async fn contains(&self, session_id: &str, provider: &str) -> bool {
        let entries = self.state.entries.lock().await;
        entries.contains(&PoolKey::new(session_id, provider))
    }

    /// Number of pooled handles at the time of the call.
    pub async fn active_count(&self) -> usize {
        self.state.entries.lock().await.len()
    }

    /// Session ids of every pooled handle, sorted.
    ///
    /// This is a projection onto the session part of the key and is not
    /// deduplicated: a session served by two providers is listed twice.
    pub async fn active_keys(&self) -> Vec<String> {
        let entries = self.state.entries.lock().await;
        let mut ids: Vec<String> = entries
            .iter()
            .map(|(key, _)| key.session_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Full keys of every pooled handle, sorted.
    pub async fn active_entries(&self) -> Vec<PoolKey> {
        let entries = self.state.entries.lock().await;
        let mut keys: Vec<PoolKey> = entries.iter().map(|(key, _)| key.clone()).collect();
        keys.sort();
        keys
    }

    /// Run one reaper sweep now. Returns the number of handles removed.
    pub async fn sweep_expired(&self) -> usize {
        self.state.sweep_expired().await
    }

    /// Get pool statistics.
    pub async fn stats(&self) -> PoolStats {
        let size = self.state.entries.lock().await.len();
        PoolStats {
            size,
            capacity: self.state.config.max_entries,
            ttl: self.state.config.ttl,
            sweep_interval: self.state.config.sweep_interval,
            reaper_running: self.is_running(),
        }
    }
}

impl<F: HandleFactory> Clone for KeyedPool<F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

/// Pool statistics.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Current number of pooled handles.
    pub size: usize,

    /// Maximum number of handles.
    pub capacity: usize,

    /// Idle TTL.
    pub ttl: Duration,

    /// Reaper sweep interval.
    pub sweep_interval: Duration,

    /// Whether the reaper is running.
    pub reaper_running: bool,
}
