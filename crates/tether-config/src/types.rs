//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8000"
//!
//! [pool]
//! ttl_minutes = 10
//! max_agents = 100
//! sweep_interval_secs = 60
//!
//! [agent]
//! session_dir = ".sessions"
//! window_size = 10
//! default_provider = "nova-lite"
//!
//! [backend]
//! kind = "openai"
//! base_url = "http://localhost:4000/v1"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [models]
//! fast = "amazon.nova-micro-v1:0"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_pool::PoolConfig;

use crate::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Agent pool sizing and expiry.
    pub pool: PoolSection,

    /// Settings applied to every agent the pool builds.
    pub agent: AgentSection,

    /// LLM backend selection.
    pub backend: BackendSection,

    /// Extra provider aliases, `provider = "model-id"`.
    ///
    /// These are added on top of the built-in aliases and replace them on
    /// conflict.
    pub models: BTreeMap<String, String>,
}

impl TetherConfig {
    /// Create a config with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pool.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pool.sweep_interval_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pool
// ─────────────────────────────────────────────────────────────────────────────

/// Agent pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    /// Minutes an agent may sit idle before the reaper drops it.
    pub ttl_minutes: u64,
    /// Maximum number of live agents.
    pub max_agents: usize,
    /// Seconds between reaper sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            ttl_minutes: 10,
            max_agents: 100,
            sweep_interval_secs: 60,
        }
    }
}

impl PoolSection {
    /// Idle TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }

    /// Sweep interval as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Build the pool configuration.
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .with_max_entries(self.max_agents)
            .with_ttl(self.ttl())
            .with_sweep_interval(self.sweep_interval())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────────────────────────────────────

/// Default system prompt for agents.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional AI assistant. \
     Answer clearly and present information naturally.";

/// Per-agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Directory holding per-session conversation logs.
    pub session_dir: PathBuf,
    /// Messages kept in each agent's context window.
    pub window_size: usize,
    /// Provider used when a request does not name one.
    pub default_provider: String,
    /// System prompt given to every agent.
    pub system_prompt: String,
    /// Upper bound on generated tokens per turn.
    pub max_tokens: u32,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            session_dir: PathBuf::from(".sessions"),
            window_size: 10,
            default_provider: "nova-lite".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 4096,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Which LLM backend the agents talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Offline backend that echoes the user's message.
    #[default]
    Mock,
    /// OpenAI-compatible `/chat/completions` endpoint.
    OpenAi,
}

/// LLM backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Backend implementation.
    pub kind: BackendKind,
    /// Base URL for the OpenAI-compatible API.
    pub base_url: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for transient errors.
    pub max_retries: u32,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            kind: BackendKind::Mock,
            base_url: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 300,
            max_retries: 3,
        }
    }
}

impl BackendSection {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TetherConfig::from_toml("").unwrap();
        assert_eq!(config, TetherConfig::default());
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.pool.ttl_minutes, 10);
        assert_eq!(config.pool.max_agents, 100);
        assert_eq!(config.agent.window_size, 10);
        assert_eq!(config.agent.session_dir, PathBuf::from(".sessions"));
        assert_eq!(config.agent.default_provider, "nova-lite");
        assert_eq!(config.backend.kind, BackendKind::Mock);
    }

    #[test]
    fn test_partial_sections() {
        let config = TetherConfig::from_toml(
            r#"
            [pool]
            max_agents = 5

            [backend]
            kind = "openai"
            base_url = "http://localhost:4000/v1"

            [models]
            fast = "amazon.nova-micro-v1:0"
            "#,
        )
        .unwrap();

        assert_eq!(config.pool.max_agents, 5);
        assert_eq!(config.pool.ttl_minutes, 10);
        assert_eq!(config.backend.kind, BackendKind::OpenAi);
        assert_eq!(
            config.backend.base_url.as_deref(),
            Some("http://localhost:4000/v1")
        );
        assert_eq!(config.models["fast"], "amazon.nova-micro-v1:0");
    }

    #[test]
    fn test_pool_conversion() {
        let section = PoolSection {
            ttl_minutes: 2,
            max_agents: 7,
            sweep_interval_secs: 5,
        };

        let pool = section.to_pool_config();
        assert_eq!(pool.max_entries, 7);
        assert_eq!(pool.ttl, Duration::from_secs(120));
        assert_eq!(pool.sweep_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let config = TetherConfig::from_toml("[pool]\nttl_minutes = 400000000000000000").unwrap();
        assert_eq!(config.pool.ttl(), Duration::from_secs(u64::MAX));
        assert_eq!(config.pool.to_pool_config().ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let err = TetherConfig::from_toml("[pool]\nsweep_interval_secs = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "pool.sweep_interval_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_backend_kind_is_error() {
        assert!(TetherConfig::from_toml("[backend]\nkind = \"carrier-pigeon\"").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = TetherConfig::default();
        config.models.insert("fast".into(), "m-1".into());

        let text = config.to_toml().unwrap();
        assert_eq!(TetherConfig::from_toml(&text).unwrap(), config);
    }
}
