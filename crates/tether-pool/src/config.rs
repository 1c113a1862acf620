//! Configuration for the keyed pool.

use std::time::Duration;

/// Default maximum number of live handles.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default idle time before a handle becomes eligible for reaping (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default interval between reaper sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for a [`KeyedPool`](crate::KeyedPool).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of handles held at once.
    /// Reaching it evicts the least recently used handle before a new one is inserted.
    pub max_entries: usize,

    /// Idle duration after which a handle is removed by the reaper.
    pub ttl: Duration,

    /// Interval between reaper sweeps.
    ///
    /// A handle can outlive its TTL by at most one interval.
    pub sweep_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of pooled handles.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the idle TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the reaper sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
