//! Blocking client for chat-completion endpoints.

use crate::{
    error::{Error, Result},
    message::Message,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Body of an OpenAI-compatible `/v1/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier understood by the endpoint
    pub model: String,
    /// Ordered conversation
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: f64,
}

impl ChatRequest {
    /// Creates a request with temperature `0.0`.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.0,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Serializes the request exactly as it is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Body of an Ollama `/api/chat` request constrained by a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredRequest {
    /// Model identifier
    pub model: String,
    /// Ordered conversation
    pub messages: Vec<Message>,
    /// JSON schema the answer must follow
    pub format: Value,
    /// Always `false`; streamed answers are not supported
    pub stream: bool,
}

impl StructuredRequest {
    /// Creates a non-streaming structured request.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>, schema: Value) -> Self {
        Self {
            model: model.into(),
            messages,
            format: schema,
            stream: false,
        }
    }
}

/// Sends chat requests to a single endpoint URL.
///
/// One request, one response: there is no retry and, unless configured, no
/// timeout.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
}

impl ChatClient {
    /// Creates a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a chat-completion request and returns `choices[0].message.content`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, a body that
    /// is not JSON, or a body without the answer field.
    #[instrument(skip_all, fields(endpoint = %self.endpoint, model = %request.model))]
    pub fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = self.post(request)?;
        answer_at(&body, "/choices/0/message/content", "choices[0].message.content")
    }

    /// Sends a schema-constrained request and returns `message.content`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::complete`].
    #[instrument(skip_all, fields(endpoint = %self.endpoint, model = %request.model))]
    pub fn complete_structured(&self, request: &StructuredRequest) -> Result<String> {
        let body = self.post(request)?;
        answer_at(&body, "/message/content", "message.content")
    }

    fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value> {
        debug!("POST {}", self.endpoint);
        let response = self.http.post(&self.endpoint).json(body).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response.text()));
        }

        let text = response.text()?;
        debug!("Received {} bytes ({})", text.len(), status);
        Ok(serde_json::from_str(&text)?)
    }
}

/// Builds the error for a non-2xx response; the status survives an unreadable body.
fn status_error<E>(status: u16, body: std::result::Result<String, E>) -> Error
where
    E: std::fmt::Display,
{
    match body {
        Ok(text) => Error::http_status(status, text),
        Err(e) => Error::http_status(status, format!("failed to read response body: {e}")),
    }
}

fn answer_at(body: &Value, pointer: &str, field: &str) -> Result<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(field))
}
