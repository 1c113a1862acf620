//! Error types for pool operations.

use crate::key::PoolKey;

/// Boxed error returned by handle factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for pool operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The factory could not build a handle. Nothing was inserted.
    #[error("Failed to construct handle for {key}: {source}")]
    Construction {
        /// Key the construction was attempted for.
        key: PoolKey,
        /// Error reported by the factory.
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Key the failed operation was for.
    pub fn key(&self) -> &PoolKey {
        match self {
            Error::Construction { key, .. } => key,
        }
    }
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, Error>;
