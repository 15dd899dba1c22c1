//! Transport seam between the notification flow and the REST client.

use std::io::Read;

use rest_client::{BodyReader, RestClient, RestError};
use serde_json::Value;

/// Blocking transport the subscriber and channel drive.
///
/// The production implementation is [`rest_client::RestClient`]; tests
/// substitute scripted implementations.
pub trait Connection {
    /// Streamed response body type.
    type Body: Read;

    /// POST a JSON body and return the parsed JSON response.
    fn post(&self, url: &str, body: &Value) -> Result<Value, RestError>;

    /// POST a JSON body and return the raw response body for incremental
    /// reading, or `None` when the server sent nothing to stream.
    fn open_stream(&self, url: &str, body: &Value) -> Result<Option<Self::Body>, RestError>;
}

impl Connection for RestClient {
    type Body = BodyReader;

    fn post(&self, url: &str, body: &Value) -> Result<Value, RestError> {
        self.post_json(url, body)
    }

    fn open_stream(&self, url: &str, body: &Value) -> Result<Option<Self::Body>, RestError> {
        self.post_streaming(url, body)
    }
}
