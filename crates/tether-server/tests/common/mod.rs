//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tether_agent::{AgentFactory, MockBackend};
use tether_pool::{KeyedPool, PoolConfig};
use tether_server::{AgentPool, Server, ServerConfig};

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client for this server.
    pub client: Client,
    /// The pool behind the server.
    pub pool: AgentPool,
    /// The backend every agent talks to.
    pub backend: Arc<MockBackend>,
    /// Session log directory.
    pub temp_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server whose agents echo every message.
    pub async fn start() -> Result<Self> {
        Self::start_with(MockBackend::echo(), PoolConfig::default()).await
    }

    /// Start a server with a specific backend and pool configuration.
    pub async fn start_with(backend: MockBackend, pool_config: PoolConfig) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = Arc::new(backend);

        let factory = AgentFactory::new(backend.clone()).with_session_dir(temp_dir.path());
        let pool = KeyedPool::new(pool_config, factory);
        pool.start();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel();
        let server = Server::new(pool.clone(), ServerConfig::new().with_bind_address(addr));
        let handle = tokio::spawn(async move {
            let _ = server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            pool,
            backend,
            temp_dir,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Get the URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send a chat message and return the raw response.
    pub async fn chat(&self, body: serde_json::Value) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url("/chat")).json(&body).send().await?)
    }

    /// Stop the server, then the pool.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        self.pool.stop().await;
        Ok(())
    }
}
