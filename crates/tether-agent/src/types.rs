//! Message and completion types shared by the agent and its backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The model side of the conversation.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One conversation message, as stored and as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A request for a single completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Provider model id.
    pub model: String,

    /// System prompt, sent ahead of the conversation.
    pub system: Option<String>,

    /// Conversation so far, oldest first, ending with the new user message.
    pub messages: Vec<Message>,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Token usage reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// A completed model response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Provider response id.
    pub id: String,

    /// Model that produced the response.
    pub model: String,

    /// Generated text.
    pub text: String,

    /// Token usage.
    pub usage: Usage,
}

impl CompletionResponse {
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        text: impl Into<String>,
        usage: Usage,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            text: text.into(),
            usage,
        }
    }
}
