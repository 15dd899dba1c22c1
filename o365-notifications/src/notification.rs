//! Notification payloads and the classifier that decodes them.
//!
//! Every object pulled off the stream is classified by its `@odata.type`
//! discriminator into either a change notification or a keep-alive
//! heartbeat. Unknown discriminators are rejected, never defaulted; the
//! channel logs and drops such objects without stopping the stream.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClassificationError;
use crate::namespace::Namespace;
use crate::types::EventType;

/// One object decoded off the notification stream.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A change happened to a subscribed resource
    Change(ChangeNotification),
    /// Heartbeat confirming the channel is healthy; no change content
    KeepAlive(KeepAlive),
}

impl Notification {
    /// The raw JSON object this notification was decoded from.
    pub fn raw(&self) -> &Value {
        match self {
            Notification::Change(change) => &change.raw,
            Notification::KeepAlive(keep_alive) => &keep_alive.raw,
        }
    }

    /// Whether this is a keep-alive heartbeat.
    pub fn is_keep_alive(&self) -> bool {
        matches!(self, Notification::KeepAlive(_))
    }
}

/// A change notification for a subscribed resource.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
    /// Notification id; absent on missed-notification markers
    pub id: Option<String>,
    /// Id of the subscription this notification belongs to
    pub subscription_id: String,
    /// When the subscription expires server-side
    pub expires: DateTime<Utc>,
    /// Provider-assigned sequence number; informational, not gap-checked
    pub sequence: Option<u64>,
    /// What happened
    pub event: EventType,
    /// The affected resource; absent on e.g. missed-notification markers
    pub resource: Option<ResourceData>,
    /// The raw JSON object as decoded from the stream
    pub raw: Value,
}

/// Reference to the resource a change notification is about.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    /// `@odata.type` token naming the resource shape
    #[serde(rename = "@odata.type")]
    pub kind: String,
    /// `@odata.id` URL of the resource
    #[serde(rename = "@odata.id")]
    pub url: String,
    /// `@odata.etag` version tag, when the provider sends one
    #[serde(rename = "@odata.etag", default)]
    pub etag: Option<String>,
    /// Resource id
    #[serde(rename = "Id")]
    pub id: String,
}

/// Keep-alive heartbeat.
#[derive(Debug, Clone)]
pub struct KeepAlive {
    /// Free-form status string, usually "OK"
    pub status: String,
    /// The raw JSON object as decoded from the stream
    pub raw: Value,
}

/// Wire shape of a change notification.
#[derive(Debug, Deserialize)]
struct ChangeWire {
    #[serde(rename = "Id", default)]
    id: Option<String>,
    #[serde(rename = "SubscriptionId")]
    subscription_id: String,
    #[serde(rename = "SubscriptionExpirationDateTime")]
    expires: String,
    #[serde(rename = "SequenceNumber", default)]
    sequence: Option<u64>,
    #[serde(rename = "ChangeType")]
    change_type: String,
    #[serde(rename = "ResourceData", default)]
    resource: Option<ResourceData>,
}

/// Wire shape of a keep-alive heartbeat.
#[derive(Debug, Deserialize)]
struct KeepAliveWire {
    #[serde(rename = "Status", default)]
    status: String,
}

/// Classify a streamed JSON object by its `@odata.type` discriminator.
///
/// # Arguments
/// * `namespace` - Protocol namespace the discriminators are expected in
/// * `raw` - The decoded JSON object
///
/// # Returns
/// The typed notification, or a [`ClassificationError`] describing why this
/// object cannot be one. Failures apply to the single object only; callers
/// keep consuming the stream.
pub fn classify(namespace: &Namespace, raw: Value) -> Result<Notification, ClassificationError> {
    let discriminator = raw
        .get("@odata.type")
        .and_then(Value::as_str)
        .ok_or(ClassificationError::MissingDiscriminator)?;

    if discriminator == namespace.keep_alive() {
        let wire: KeepAliveWire = serde_json::from_value(raw.clone())?;
        return Ok(Notification::KeepAlive(KeepAlive {
            status: wire.status,
            raw,
        }));
    }

    if discriminator != namespace.notification() {
        return Err(ClassificationError::UnknownNotificationType(
            discriminator.to_string(),
        ));
    }

    let wire: ChangeWire = serde_json::from_value(raw.clone())?;
    let event = EventType::from_wire_token(&wire.change_type)
        .ok_or_else(|| ClassificationError::UnknownEventKind(wire.change_type.clone()))?;
    let expires = parse_expiry(&wire.expires)
        .ok_or_else(|| ClassificationError::InvalidTimestamp(wire.expires.clone()))?;

    Ok(Notification::Change(ChangeNotification {
        // Missed-notification markers carry the literal string "null"
        id: wire.id.filter(|id| id.as_str() != "null"),
        subscription_id: wire.subscription_id,
        expires,
        sequence: wire.sequence,
        event,
        resource: wire.resource,
        raw,
    }))
}

/// Parse the provider's ISO-8601 expiry timestamps.
///
/// Accepts both offset forms ("2023-01-09T20:45:31.391Z") and naive forms
/// ("2023-01-09T20:45:31"), reading the latter as UTC.
fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
