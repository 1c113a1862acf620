//! Builds pooled agents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tether_pool::{BoxError, EvictionReason, HandleFactory, PoolKey};
use tracing::debug;

use crate::agent::{Agent, DEFAULT_MAX_TOKENS};
use crate::backend::SharedBackend;
use crate::catalog::ModelCatalog;
use crate::store::SessionStore;
use crate::window::DEFAULT_WINDOW_SIZE;

/// Default directory for session logs.
pub const DEFAULT_SESSION_DIR: &str = ".sessions";

/// [`HandleFactory`] producing an [`Agent`] per session and provider.
///
/// Each agent gets its model id from the catalog, its own session store
/// under `session_dir`, and a conversation window of `window_size` messages.
/// All agents share one backend.
#[derive(Clone)]
pub struct AgentFactory {
    backend: SharedBackend,
    catalog: ModelCatalog,
    session_dir: PathBuf,
    window_size: usize,
    system_prompt: Option<String>,
    max_tokens: u32,
}

impl AgentFactory {
    /// Create a factory with default settings over `backend`.
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            catalog: ModelCatalog::default(),
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            window_size: DEFAULT_WINDOW_SIZE,
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the model catalog.
    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the session log directory.
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Set the conversation window size.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Set the system prompt given to every agent.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the per-turn token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Directory holding session logs.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Build an agent directly, outside any pool.
    pub fn build(&self, session_id: &str, provider: &str) -> crate::Result<Agent> {
        let store = SessionStore::open(&self.session_dir, session_id)?;
        let model_id = self.catalog.resolve(provider);

        let mut agent = Agent::new(
            provider,
            model_id,
            self.backend.clone(),
            store,
            self.window_size,
        )?
        .with_max_tokens(self.max_tokens);

        if let Some(prompt) = &self.system_prompt {
            agent = agent.with_system_prompt(prompt.clone());
        }
        Ok(agent)
    }
}

#[async_trait]
impl HandleFactory for AgentFactory {
    type Handle = Agent;

    async fn create(&self, key: &PoolKey) -> Result<Agent, BoxError> {
        // Opening the store and loading history are blocking file reads.
        let factory = self.clone();
        let key = key.clone();
        let agent =
            tokio::task::spawn_blocking(move || factory.build(&key.session_id, &key.provider))
                .await??;
        Ok(agent)
    }

    fn on_evict(&self, key: &PoolKey, _agent: &Agent, reason: EvictionReason) {
        // History is already on disk; nothing to release.
        debug!(key = %key, ?reason, "Agent left the pool");
    }
}
