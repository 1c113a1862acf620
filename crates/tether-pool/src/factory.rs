//! Handle construction hooks.
//!
//! The pool never builds handles itself. A [`HandleFactory`] turns the parts of
//! a [`PoolKey`] into a handle and is told when the pool lets a handle go, so
//! handles that own external resources can release them.

use std::future::Future;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::key::PoolKey;

/// Why a handle left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Idle longer than the TTL; removed by a sweep.
    Expired,
    /// Least recently used handle dropped to make room for a new one.
    Capacity,
    /// Removed by an explicit `remove` call.
    Removed,
    /// Dropped while the pool was being stopped.
    Cleared,
}

/// Builds the handles a [`KeyedPool`](crate::KeyedPool) hands out.
#[async_trait]
pub trait HandleFactory: Send + Sync + 'static {
    /// The pooled handle type.
    type Handle: Send + Sync + 'static;

    /// Build a handle for `key`.
    ///
    /// Runs while the pool lock is held, so every other pool operation waits
    /// for it to finish. An error leaves the pool untouched.
    async fn create(&self, key: &PoolKey) -> Result<Self::Handle, BoxError>;

    /// Called whenever a handle leaves the pool, on every removal path.
    ///
    /// Runs under the pool lock and must not block. Callers still holding the
    /// handle keep it alive after this returns. The default does nothing.
    fn on_evict(&self, _key: &PoolKey, _handle: &Self::Handle, _reason: EvictionReason) {}
}

/// A [`HandleFactory`] backed by an async closure.
///
/// Created with [`from_fn`].
#[derive(Debug, Clone)]
pub struct FnFactory<F> {
    f: F,
}

/// Build a factory from a closure taking the key by value.
///
/// ```rust,ignore
/// let pool = KeyedPool::new(PoolConfig::default(), from_fn(|key: PoolKey| async move {
///     Ok::<_, BoxError>(format!("handle for {key}"))
/// }));
/// ```
pub fn from_fn<F>(f: F) -> FnFactory<F> {
    FnFactory { f }
}

#[async_trait]
impl<F, Fut, H> HandleFactory for FnFactory<F>
where
    F: Fn(PoolKey) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<H, BoxError>> + Send + 'static,
    H: Send + Sync + 'static,
{
    type Handle = H;

    async fn create(&self, key: &PoolKey) -> Result<H, BoxError> {
        (self.f)(key.clone()).await
    }
}
