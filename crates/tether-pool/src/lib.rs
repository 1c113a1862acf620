//! Session-keyed pool for expensive, stateful handles.
//!
//! This crate keeps at most one live handle per (session, provider) pair:
//! - Handles are built lazily by a [`HandleFactory`] on first use
//! - Reuse refreshes the handle's last access time
//! - LRU eviction keeps the pool within its capacity
//! - A background reaper drops handles idle longer than the TTL
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_pool::{KeyedPool, PoolConfig, from_fn};
//!
//! let config = PoolConfig::default()
//!     .with_max_entries(100)
//!     .with_ttl(Duration::from_secs(600));
//!
//! let pool = KeyedPool::new(config, from_fn(|key| async move { build(key).await }));
//! pool.start();
//! let handle = pool.get("session-1", "nova-lite").await?;
//! // ...
//! pool.stop().await;
//! ```

mod config;
mod error;
mod factory;
mod key;
mod pool;
mod reaper;

pub use config::{DEFAULT_MAX_ENTRIES, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL, PoolConfig};
pub use error::{BoxError, Error, Result};
pub use factory::{EvictionReason, FnFactory, HandleFactory, from_fn};
pub use key::PoolKey;
pub use pool::{KeyedPool, PoolStats};
