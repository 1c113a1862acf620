//! Pooled conversational agents for Tether.
//!
//! An [`Agent`] is the expensive, stateful handle kept in a
//! [`tether_pool::KeyedPool`]. It binds together:
//!
//! - a model id, resolved from the provider name by a [`ModelCatalog`]
//! - a [`SessionStore`] holding the session's JSONL conversation log
//! - a [`ConversationWindow`] bounding the context sent to the model
//! - a shared [`LlmBackend`] that produces replies
//!
//! [`AgentFactory`] implements [`tether_pool::HandleFactory`] so the pool can
//! build agents on demand.

pub mod agent;
pub mod backend;
pub mod catalog;
pub mod error;
pub mod factory;
pub mod openai;
pub mod store;
pub mod types;
pub mod window;

pub use agent::{Agent, AgentReply, DEFAULT_MAX_TOKENS};
pub use backend::{LlmBackend, MockBackend, SharedBackend, with_retry};
pub use catalog::{DEFAULT_PROVIDER, ModelCatalog};
pub use error::{AgentError, LlmError, Result};
pub use factory::{AgentFactory, DEFAULT_SESSION_DIR};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use store::{SessionStore, validate_session_id};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, Usage};
pub use window::{ConversationWindow, DEFAULT_WINDOW_SIZE};
