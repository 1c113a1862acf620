//! Conversation history endpoint.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tether_agent::{Message, SessionStore};
use tracing::warn;

use crate::state::AppState;

/// Stored conversation for one session.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
}

/// Read a session's history from disk.
///
/// Does not touch the pool. Unknown sessions and unreadable logs both come
/// back as an empty list.
pub async fn history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    let dir = state.session_dir().to_path_buf();
    let id = session_id.clone();

    let messages = match tokio::task::spawn_blocking(move || SessionStore::read_history(&dir, &id))
        .await
    {
        Ok(Ok(messages)) => messages,
        Ok(Err(e)) => {
            warn!(session_id = %session_id, error = %e, "Failed to read session history");
            Vec::new()
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "History read task failed");
            Vec::new()
        }
    };

    Json(HistoryResponse {
        session_id,
        messages,
    })
}
