//! HTTP API for the tether agent pool.
//!
//! Routes:
//!
//! - `POST /chat` sends a message to the session's pooled agent
//! - `GET /health` reports pool occupancy
//! - `GET /history/{session_id}` reads a session's log from disk
//! - `DELETE /session/{session_id}` drops a session's agent from the pool
//!
//! The server does not own the pool lifecycle. Callers `start()` the pool
//! before serving and `stop()` it after [`Server::run`] returns.
//!
//! # Example
//!
//! ```ignore
//! use tether_server::{Server, ServerConfig};
//!
//! let pool = KeyedPool::new(PoolConfig::default(), AgentFactory::new(backend));
//! pool.start();
//!
//! let server = Server::new(pool.clone(), ServerConfig::new());
//! server.run(shutdown_signal()).await?;
//!
//! pool.stop().await;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{DEFAULT_BIND_ADDRESS, ServerConfig};
pub use error::{ErrorResponse, Result, ServerError};
pub use routes::{ChatRequest, ChatResponse, HealthResponse, HistoryResponse, RemoveResponse};
pub use state::{AgentPool, AppState};

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The tether HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server over `pool`.
    pub fn new(pool: AgentPool, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(pool, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{delete, get, post};

        Router::new()
            .route("/health", get(routes::health))
            .route("/chat", post(routes::chat_handler))
            .route("/history/{session_id}", get(routes::history_handler))
            .route("/session/{session_id}", delete(routes::remove_session_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address until `shutdown` resolves.
    pub async fn run<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!("Starting server on {}", addr);
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tether_agent::{AgentFactory, MockBackend};
    use tether_pool::{KeyedPool, PoolConfig};
    use tower::ServiceExt;

    fn test_server(dir: &std::path::Path) -> Server {
        let factory =
            AgentFactory::new(Arc::new(MockBackend::echo())).with_session_dir(dir.to_path_buf());
        Server::new(
            KeyedPool::new(PoolConfig::default(), factory),
            ServerConfig::new(),
        )
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_server(dir.path()).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_server(dir.path()).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::new()
            .with_bind_address("0.0.0.0:9000".parse().unwrap())
            .with_default_provider("anthropic");

        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(
            ServerConfig::default().bind_address.to_string(),
            DEFAULT_BIND_ADDRESS
        );
    }
}
