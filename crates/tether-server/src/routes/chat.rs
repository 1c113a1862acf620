//! Chat endpoint.

use std::sync::LazyLock;

use axum::{Json, extract::State};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Session used when a request does not name one.
pub const DEFAULT_SESSION_ID: &str = "default-session";

static THINKING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<thinking>.*?</thinking>").expect("thinking block pattern is valid")
});

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// Session whose conversation this message continues.
    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// Provider to answer with. Defaults to the server's default provider.
    #[serde(default)]
    pub model_provider: Option<String>,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The agent's cleaned response text.
    pub response: String,

    /// The session the message was added to.
    pub session_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Send a message to the session's agent.
///
/// The first request for a (session, provider) pair builds the agent and
/// loads its history from disk; later requests reuse the pooled agent until
/// it expires or is evicted.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message must not be empty".to_string()));
    }

    let provider = state.provider_or_default(request.model_provider);
    let agent = state.pool.get(&request.session_id, &provider).await?;

    let reply = agent.invoke(&request.message).await?;
    debug!(
        session_id = %request.session_id,
        provider = %provider,
        model = %reply.model,
        "Chat reply ready"
    );

    Ok(Json(ChatResponse {
        response: clean_response(&reply.text),
        session_id: request.session_id,
    }))
}

/// Strip `<thinking>` blocks from model output and trim the rest.
pub fn clean_response(text: &str) -> String {
    THINKING_BLOCK.replace_all(text, "").trim().to_string()
}
