//! LLM backend trait and implementations.
//!
//! The agent talks to its model through [`LlmBackend`]. This module also
//! provides the retry helper shared by HTTP backends and a mock backend for
//! tests and offline runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, Role, Usage};

/// Result type for backend calls.
pub type Result<T> = std::result::Result<T, LlmError>;

/// A backend shared between every agent in the pool.
pub type SharedBackend = Arc<dyn LlmBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors. Non-retryable errors are returned
/// immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    backend = backend_name,
                    attempt,
                    max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for LLM backend providers.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A mock backend for tests and offline use.
///
/// Returns pre-configured responses in order. Once they run out it either
/// fails or, in echo mode, answers with the last user message.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: parking_lot::Mutex<VecDeque<CompletionResponse>>,
    request_log: parking_lot::Mutex<Vec<CompletionRequest>>,
    echo: bool,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: parking_lot::Mutex::new(responses.into()),
            request_log: parking_lot::Mutex::new(Vec::new()),
            echo: false,
        }
    }

    /// Create a mock backend that replies with the given texts, in order.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    CompletionResponse::new(
                        format!("mock_msg_{}", i + 1),
                        "mock-model",
                        text,
                        Usage::new(10, 20),
                    )
                })
                .collect(),
        )
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_texts([text.into()])
    }

    /// Create a mock backend that echoes every user message back.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::new(Vec::new())
        }
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone());
        self.request_log.lock().push(request);

        if let Some(response) = self.responses.lock().pop_front() {
            return Ok(response);
        }

        if self.echo {
            let count = self.request_count();
            return Ok(CompletionResponse::new(
                format!("echo_msg_{count}"),
                model,
                format!("Echo: {}", last_user.unwrap_or_default()),
                Usage::default(),
            ));
        }

        Err(LlmError::Backend(
            "MockBackend: no more responses available".to_string(),
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
