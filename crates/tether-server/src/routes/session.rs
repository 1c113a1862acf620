//! Pool eviction endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;

/// Query parameters for removing a session's agent.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveQuery {
    /// Provider of the agent to drop. Defaults to the server's default provider.
    #[serde(default)]
    pub provider: Option<String>,
}

/// Response from the remove endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub status: String,
    pub session_id: String,
}

/// Drop a session's agent from the pool, keeping its history on disk.
///
/// The next chat request for the session builds a fresh agent. Removing an
/// agent that is not pooled succeeds too.
pub async fn remove_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<RemoveQuery>,
) -> Json<RemoveResponse> {
    let provider = state.provider_or_default(query.provider);
    let removed = state.pool.remove(&session_id, &provider).await;

    info!(session_id = %session_id, provider = %provider, removed, "Session agent removed");

    Json(RemoveResponse {
        status: "removed".to_string(),
        session_id,
    })
}
