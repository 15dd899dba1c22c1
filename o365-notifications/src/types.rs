//! Core types for the o365-notifications crate.

use serde_json::Value;

/// Kinds of change event a subscription can deliver.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum EventType {
    /// Server acknowledgment of a new subscription
    Acknowledgement,
    /// A resource was created
    Created,
    /// A resource was deleted
    Deleted,
    /// Notifications were dropped server-side; the client should resync
    Missed,
    /// A resource was updated
    Updated,
}

impl EventType {
    /// Wire token for this event kind.
    ///
    /// Tokens are case-sensitive. The provider spells the acknowledgment
    /// token without the middle "e".
    pub fn wire_token(&self) -> &'static str {
        match self {
            EventType::Acknowledgement => "Acknowledgment",
            EventType::Created => "Created",
            EventType::Deleted => "Deleted",
            EventType::Missed => "Missed",
            EventType::Updated => "Updated",
        }
    }

    /// Map a wire token back to its event kind.
    pub fn from_wire_token(token: &str) -> Option<Self> {
        match token {
            "Acknowledgment" => Some(EventType::Acknowledgement),
            "Created" => Some(EventType::Created),
            "Deleted" => Some(EventType::Deleted),
            "Missed" => Some(EventType::Missed),
            "Updated" => Some(EventType::Updated),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_token())
    }
}

/// Delivery flavors a subscription can request.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubscriptionType {
    /// Notifications pushed to a webhook; not driven by this crate
    Push,
    /// Notifications streamed over a long-lived response body
    Streaming,
}

/// A tracked subscription for one mailbox resource.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Server-assigned subscription id, set once the create call succeeds
    pub id: Option<String>,
    /// Delivery flavor requested for this subscription
    pub kind: SubscriptionType,
    /// Resolved URL of the subscribed resource; its identity in the registry
    pub resource_url: String,
    /// Event kinds this subscription covers, in registration order
    pub events: Vec<EventType>,
    /// Last raw server payload for this subscription
    pub raw: Option<Value>,
}

impl Subscription {
    pub(crate) fn new(kind: SubscriptionType, resource_url: String, events: Vec<EventType>) -> Self {
        Self {
            id: None,
            kind,
            resource_url,
            events,
            raw: None,
        }
    }

    /// Comma-joined wire tokens of the covered events, as sent in `ChangeType`.
    pub fn change_type(&self) -> String {
        self.events
            .iter()
            .map(|event| event.wire_token())
            .collect::<Vec<_>>()
            .join(",")
    }
}
