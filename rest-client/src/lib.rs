//! Private REST client for Outlook API communication
//!
//! This crate provides a minimal blocking REST client specifically designed
//! for the Outlook notification endpoints. It supports plain JSON POST calls
//! and streaming POST calls whose response body is handed back to the caller
//! for incremental reading.

mod error;

pub use error::RestError;

use std::io::Read;
use std::time::Duration;

use serde_json::Value;

/// Streamed response body, read incrementally by the caller
pub struct BodyReader {
    inner: Box<dyn Read + Send + Sync + 'static>,
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl std::fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BodyReader")
    }
}

/// A minimal blocking REST client for the Outlook API
///
/// The agent uses a connect timeout but no read timeout: notification
/// streaming responses stay open for minutes, with keep-alives arriving
/// every few seconds while the channel is healthy.
#[derive(Debug, Clone)]
pub struct RestClient {
    agent: ureq::Agent,
    bearer_token: Option<String>,
}

impl RestClient {
    /// Create a new REST client with default configuration
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .build(),
            bearer_token: None,
        }
    }

    /// Create a client that authenticates with a pre-acquired bearer token
    ///
    /// Token acquisition and refresh are the application's job; this client
    /// only attaches the token to every request.
    pub fn with_bearer_token(token: impl Into<String>) -> Self {
        let mut client = Self::new();
        client.bearer_token = Some(token.into());
        client
    }

    /// Replace the bearer token, e.g. after the application refreshed it
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.bearer_token = Some(token.into());
    }

    /// POST a JSON body and parse the JSON response
    pub fn post_json(&self, url: &str, body: &Value) -> Result<Value, RestError> {
        let response = self.request(url).send_json(body).map_err(map_ureq_error)?;

        response
            .into_json::<Value>()
            .map_err(|e| RestError::Parse(e.to_string()))
    }

    /// POST a JSON body and hand back the raw response body for streaming
    ///
    /// Returns `Ok(None)` when the server answers with no content (status
    /// 204 or an empty body), which the notification endpoints use to signal
    /// there is nothing to stream.
    pub fn post_streaming(&self, url: &str, body: &Value) -> Result<Option<BodyReader>, RestError> {
        let response = self.request(url).send_json(body).map_err(map_ureq_error)?;

        if response.status() == 204 || response.header("Content-Length") == Some("0") {
            return Ok(None);
        }

        Ok(Some(BodyReader {
            inner: Box::new(response.into_reader()),
        }))
    }

    fn request(&self, url: &str) -> ureq::Request {
        let mut request = self.agent.post(url).set("Accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }
        request
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_ureq_error(err: ureq::Error) -> RestError {
    match err {
        ureq::Error::Status(code, response) => RestError::Status {
            code,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => RestError::Network(transport.to_string()),
    }
}
