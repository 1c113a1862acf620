//! HTTP route handlers.

pub mod chat;
pub mod health;
pub mod history;
pub mod session;

pub use chat::{ChatRequest, ChatResponse, chat_handler, clean_response};
pub use health::{HealthResponse, health};
pub use history::{HistoryResponse, history_handler};
pub use session::{RemoveQuery, RemoveResponse, remove_session_handler};
