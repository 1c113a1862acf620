//! Health check endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response with pool status.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Number of live agents.
    pub active_sessions: usize,
    /// Session id of every live agent, one per (session, provider) entry.
    pub sessions: Vec<String>,
}

/// Report service health and which sessions hold a live agent.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions = state.pool.active_keys().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        active_sessions: sessions.len(),
        sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use std::sync::Arc;
    use tether_agent::{AgentFactory, MockBackend};
    use tether_pool::{KeyedPool, PoolConfig};
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    #[tokio::test]
    async fn test_health_count_matches_session_list() {
        let dir = tempfile::tempdir().unwrap();
        let factory =
            AgentFactory::new(Arc::new(MockBackend::echo())).with_session_dir(dir.path());
        let pool = KeyedPool::new(PoolConfig::default(), factory);
        pool.get("s1", "nova-lite").await.unwrap();
        pool.get("s1", "anthropic").await.unwrap();

        let app = Router::new()
            .route("/health", get(health))
            .with_state(AppState::new(pool, ServerConfig::new()));

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

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.active_sessions, health.sessions.len());
        assert_eq!(health.sessions, vec!["s1", "s1"]);
    }
}
