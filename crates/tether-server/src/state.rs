//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use tether_agent::AgentFactory;
use tether_pool::KeyedPool;

use crate::config::ServerConfig;

/// The pool type served over HTTP.
pub type AgentPool = KeyedPool<AgentFactory>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pool of live agents.
    pub pool: AgentPool,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(pool: AgentPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Directory holding session logs.
    pub fn session_dir(&self) -> &Path {
        self.pool.factory().session_dir()
    }

    /// The provider to use when a request leaves it out.
    pub fn provider_or_default(&self, provider: Option<String>) -> String {
        provider
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.config.default_provider.clone())
    }
}
