//! OpenAI-compatible chat completions backend.
//!
//! Works against any service exposing `/chat/completions` in the OpenAI
//! format, including gateways that front Bedrock model ids.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{LlmBackend, Result, with_retry};
use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, Usage};

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication (optional for local gateways).
    pub api_key: Option<String>,

    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,

    /// Name for this backend instance.
    pub name: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            name: "openai".to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set retry backoff.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible API backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(header::CONTENT_TYPE, "application/json");
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn handle_response(response: Response) -> Result<CompletionResponse> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(message),
                429 => LlmError::RateLimit(message),
                500..=599 => LlmError::Server(message),
                _ => LlmError::Backend(message),
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&body)?;
        parsed.try_into()
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = ApiRequest::from(&request);
        debug!(
            backend = %self.config.name,
            model = %body.model,
            messages = body.messages.len(),
            "Sending completion request"
        );

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            &self.config.name,
            || async {
                let response = self
                    .add_headers(self.client.post(self.completions_url()))
                    .json(&body)
                    .send()
                    .await?;
                Self::handle_response(response).await
            },
        )
        .await
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

impl From<&CompletionRequest> for ApiRequest {
    fn from(request: &CompletionRequest) -> Self {
        let system = request.system.iter().map(|prompt| ApiMessage {
            role: "system".to_string(),
            content: prompt.clone(),
        });
        let conversation = request.messages.iter().map(|m| ApiMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        });

        Self {
            model: request.model.clone(),
            messages: system.chain(conversation).collect(),
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl TryFrom<ApiResponse> for CompletionResponse {
    type Error = LlmError;

    fn try_from(response: ApiResponse) -> Result<Self> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Backend("Response contained no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse::new(
            response.id,
            response.model,
            choice.message.content.unwrap_or_default(),
            usage,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_request_puts_system_prompt_first() {
        let request = CompletionRequest {
            model: "amazon.nova-lite-v1:0".to_string(),
            system: Some("be brief".to_string()),
            messages: vec![Message::user("hi"), Message::assistant("hello")],
            max_tokens: 256,
        };

        let body = serde_json::to_value(ApiRequest::from(&request)).unwrap();
        assert_eq!(body["model"], "amazon.nova-lite-v1:0");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][2]["role"], "assistant");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-test",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi!"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;

        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        let response = CompletionResponse::try_from(parsed).unwrap();
        assert_eq!(response.text, "Hi!");
        assert_eq!(response.usage, Usage::new(12, 3));
    }

    #[test]
    fn test_empty_choices_is_error() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            CompletionResponse::try_from(parsed),
            Err(LlmError::Backend(_))
        ));
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let backend = OpenAiBackend::new(OpenAiConfig::new("http://localhost:4000/v1/")).unwrap();
        assert_eq!(
            backend.completions_url(),
            "http://localhost:4000/v1/chat/completions"
        );
    }
}
