//! Server configuration.

use std::net::SocketAddr;

use tether_agent::DEFAULT_PROVIDER;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Provider used when a request does not name one.
    pub default_provider: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            default_provider: DEFAULT_PROVIDER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the default provider.
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }
}
