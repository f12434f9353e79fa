//! OpenAI-compatible chat completion client used for AI search.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{BackendError, GeneratedText, HttpTimeouts, TextGenerator, TextRequest};
use super::build_http_client;
use crate::admission::CallError;
use crate::user_agent;

/// Default API base URL for text generation.
pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Text generator backed by an OpenAI-compatible HTTP API.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    /// Creates a generator posting to `{endpoint}/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the endpoint is not an absolute URL or the
    /// HTTP client cannot be built.
    #[instrument(skip(api_key, timeouts), fields(has_key = api_key.is_some()))]
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        Url::parse(endpoint).map_err(|e| BackendError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let client = build_http_client(timeouts, user_agent::default_user_agent())?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }
}

impl std::fmt::Debug for HttpTextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTextGenerator")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    #[instrument(skip(self, request), fields(model = %request.model, max_tokens = request.max_tokens))]
    async fn generate_text(&self, request: &TextRequest) -> Result<GeneratedText, CallError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "messages": [{ "role": "user", "content": request.prompt }],
        });

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "AI request failed");
            CallError::remote(format!("AI request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let raw = response.text().await.unwrap_or_default();
            debug!(status = code, "AI API returned error status");
            return Err(error_from_body(&raw, code));
        }

        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
            warn!(error = %e, "failed to parse AI response JSON");
            CallError::remote("Unexpected AI response format")
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(GeneratedText { text })
    }
}

/// Maps an error response body to a [`CallError`] keeping message, code and status.
fn error_from_body(raw: &str, status: u16) -> CallError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(raw).ok();
    let message = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.message.clone())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("AI request failed with HTTP {status}"));
    let code = parsed
        .and_then(|envelope| envelope.error.code)
        .and_then(|code| match code {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    CallError::Remote {
        message,
        code,
        status: Some(status),
    }
}
