//! Error types for the o365-notifications crate.

use rest_client::RestError;

/// Errors from subscription and channel operations.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The resource already has a subscription covering every requested event
    #[error("Subscription for '{resource}' already covers the requested events")]
    DuplicateSubscription {
        /// Resolved URL of the resource
        resource: String,
    },

    /// An event channel was opened without any registered subscription
    #[error("No subscription to open an event channel for")]
    NoSubscriptions,

    /// Transport-level failure reported by the REST client
    #[error("Transport error: {0}")]
    Transport(#[from] RestError),

    /// The server response is missing data the protocol requires
    #[error("Unexpected server response: {0}")]
    UnexpectedResponse(String),

    /// The notification stream failed in a non-recoverable way
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

/// Errors classifying a single streamed object.
///
/// These are per-object failures: the channel logs the object and moves on,
/// classification never aborts the stream.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// The object carries no string `@odata.type` field
    #[error("Missing '@odata.type' discriminator")]
    MissingDiscriminator,

    /// The discriminator names a type this crate does not know
    #[error("Unknown notification type: {0}")]
    UnknownNotificationType(String),

    /// The `ChangeType` token names an event kind this crate does not know
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// The notification expiry is not an ISO-8601 timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The object is valid JSON but not a notification payload
    #[error("Malformed notification payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors reading objects out of the streamed response body.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The connection dropped mid-stream; the read pass ends and whatever
    /// was already delivered stays delivered
    #[error("Stream interrupted: {0}")]
    Interrupted(String),

    /// Non-recoverable I/O failure on the response body
    #[error("Read error: {0}")]
    Io(#[source] std::io::Error),

    /// A streamed object was not valid JSON; applies to that object only
    #[error("Invalid JSON object in stream: {0}")]
    Json(#[source] serde_json::Error),
}

/// Convenience type alias for Results using NotificationError.
pub type Result<T> = std::result::Result<T, NotificationError>;
