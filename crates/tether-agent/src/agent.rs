//! The pooled agent handle.

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::SharedBackend;
use crate::error::{AgentError, Result};
use crate::store::SessionStore;
use crate::types::{CompletionRequest, Message, Usage};
use crate::window::ConversationWindow;

/// Default upper bound on generated tokens per turn.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Output of one agent turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Raw model text.
    pub text: String,

    /// Model that produced the reply.
    pub model: String,

    /// Token usage for the turn.
    pub usage: Usage,
}

/// A conversational agent bound to one session and one model.
///
/// Building an agent reads the session's history from disk once; afterwards
/// the conversation lives in memory and each turn only appends to the log.
/// Turns on the same agent are serialised by the agent itself, independently
/// of the pool that hands it out.
pub struct Agent {
    provider: String,
    model_id: String,
    system_prompt: Option<String>,
    max_tokens: u32,
    backend: SharedBackend,
    store: SessionStore,
    conversation: Mutex<ConversationWindow>,
}

impl Agent {
    /// Create an agent over an opened session store.
    ///
    /// The conversation window is seeded from the stored history.
    pub fn new(
        provider: impl Into<String>,
        model_id: impl Into<String>,
        backend: SharedBackend,
        store: SessionStore,
        window_size: usize,
    ) -> Result<Self> {
        let history = store.load()?;
        let loaded = history.len();
        let window = ConversationWindow::from_history(history, window_size);

        let agent = Self {
            provider: provider.into(),
            model_id: model_id.into(),
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            backend,
            store,
            conversation: Mutex::new(window),
        };

        debug!(
            session_id = %agent.session_id(),
            model = %agent.model_id,
            loaded,
            "Agent created"
        );
        Ok(agent)
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the per-turn token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Session this agent serves.
    pub fn session_id(&self) -> &str {
        self.store.session_id()
    }

    /// Provider name the agent was requested with.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Backend model id.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Number of messages currently in the context window.
    pub async fn window_len(&self) -> usize {
        self.conversation.lock().await.len()
    }

    /// Run one turn: send `message` with the current context and record the exchange.
    ///
    /// On a backend or storage error nothing is recorded in memory.
    pub async fn invoke(&self, message: &str) -> Result<AgentReply> {
        let mut conversation = self.conversation.lock().await;

        let user = Message::user(message);
        let mut messages: Vec<Message> = conversation.messages().cloned().collect();
        messages.push(user.clone());

        let request = CompletionRequest {
            model: self.model_id.clone(),
            system: self.system_prompt.clone(),
            messages,
            max_tokens: self.max_tokens,
        };

        let response = self.backend.complete(request).await?;
        let assistant = Message::assistant(response.text.clone());

        let store = self.store.clone();
        let turn = [user.clone(), assistant.clone()];
        tokio::task::spawn_blocking(move || store.append(&turn))
            .await
            .map_err(|e| AgentError::Storage(std::io::Error::other(e)))??;

        conversation.push(user);
        conversation.push(assistant);

        info!(
            session_id = %self.session_id(),
            provider = %self.provider,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Agent turn complete"
        );

        Ok(AgentReply {
            text: response.text,
            model: response.model,
            usage: response.usage,
        })
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("session_id", &self.session_id())
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}
