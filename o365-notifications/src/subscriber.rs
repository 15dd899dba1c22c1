//! Subscription creation, tracking, and renewal.
//!
//! A [`Subscriber`] owns the registry of subscriptions it has created for
//! one mailbox and drives the create/renew calls over its [`Connection`].
//! There is no process-wide registry: each subscriber tracks only its own
//! subscriptions, and `&mut self` on the mutating calls keeps the registry
//! single-writer.

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::{NotificationError, Result};
use crate::namespace::{ApiProtocol, Namespace};
use crate::resource::Subscribable;
use crate::types::{EventType, Subscription, SubscriptionType};

/// Path of the subscription management endpoint, relative to the mailbox URL.
const SUBSCRIPTIONS_ENDPOINT: &str = "/subscriptions";

/// Path of the notification streaming endpoint, relative to the mailbox URL.
const NOTIFICATIONS_ENDPOINT: &str = "/GetNotifications";

/// Insertion-ordered registry of the subscriptions one subscriber created.
///
/// A resource (identified by its resolved URL) has at most one entry; asking
/// for more event kinds widens that entry instead of adding a second one.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
}

impl SubscriptionRegistry {
    /// Register events for a resource, unioning with any existing entry.
    ///
    /// Returns the index of the entry to (re-)submit, or
    /// `DuplicateSubscription` when the request adds nothing new to what the
    /// entry already covers.
    pub(crate) fn register(
        &mut self,
        resource_url: &str,
        kind: SubscriptionType,
        events: &[EventType],
    ) -> Result<usize> {
        let mut requested: Vec<EventType> = Vec::new();
        for event in events {
            if !requested.contains(event) {
                requested.push(*event);
            }
        }

        let position = self
            .entries
            .iter()
            .position(|entry| entry.resource_url == resource_url);

        match position {
            Some(index) => {
                let entry = &mut self.entries[index];
                let fresh: Vec<EventType> = requested
                    .into_iter()
                    .filter(|event| !entry.events.contains(event))
                    .collect();
                if fresh.is_empty() {
                    return Err(NotificationError::DuplicateSubscription {
                        resource: resource_url.to_string(),
                    });
                }
                entry.events.extend(fresh);
                Ok(index)
            }
            None => {
                if requested.is_empty() {
                    return Err(NotificationError::DuplicateSubscription {
                        resource: resource_url.to_string(),
                    });
                }
                self.entries
                    .push(Subscription::new(kind, resource_url.to_string(), requested));
                Ok(self.entries.len() - 1)
            }
        }
    }

    /// Record the server payload of a successful create/renew call.
    pub(crate) fn commit(&mut self, index: usize, payload: Value) -> Result<()> {
        let id = payload
            .get("Id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                NotificationError::UnexpectedResponse("subscribe response has no 'Id'".to_string())
            })?
            .to_string();

        let entry = &mut self.entries[index];
        entry.id = Some(id);
        entry.raw = Some(payload);
        Ok(())
    }

    /// All entries, in the order their resources were first registered.
    pub fn all(&self) -> &[Subscription] {
        &self.entries
    }

    /// Look up the entry for a resolved resource URL.
    pub fn get(&self, resource_url: &str) -> Option<&Subscription> {
        self.entries
            .iter()
            .find(|entry| entry.resource_url == resource_url)
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Committed subscription ids, in registry order.
    pub fn subscription_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.id.clone())
            .collect()
    }
}

/// Creates and renews streaming subscriptions for one mailbox.
///
/// # Example
/// ```rust,ignore
/// use o365_notifications::prelude::*;
///
/// let client = RestClient::with_bearer_token(token);
/// let mut subscriber = Subscriber::new(client, "https://outlook.office.com/api/beta/me");
///
/// let inbox = MailFolder::inbox("https://outlook.office.com/api/beta/me");
/// subscriber.subscribe(&inbox, &[EventType::Created, EventType::Updated])?;
/// ```
#[derive(Debug)]
pub struct Subscriber<C: Connection> {
    connection: C,
    base_url: String,
    namespace: Namespace,
    registry: SubscriptionRegistry,
}

impl<C: Connection> Subscriber<C> {
    /// Create a subscriber for a mailbox served over the Outlook protocol.
    ///
    /// `base_url` is the mailbox API root, e.g.
    /// `https://outlook.office.com/api/beta/me`.
    pub fn new(connection: C, base_url: impl Into<String>) -> Self {
        Self::with_protocol(connection, base_url, ApiProtocol::Outlook)
    }

    /// Create a subscriber for a mailbox served over a specific protocol.
    pub fn with_protocol(
        connection: C,
        base_url: impl Into<String>,
        protocol: ApiProtocol,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            connection,
            base_url: base_url.trim_end_matches('/').to_string(),
            namespace: Namespace::new(protocol),
            registry: SubscriptionRegistry::default(),
        }
    }

    /// Subscribe a resource to streaming change notifications.
    ///
    /// Re-subscribing an already-tracked resource with additional event
    /// kinds widens the existing subscription instead of creating a second
    /// one; the full widened event set is re-submitted to the server and
    /// the entry's id is replaced by the fresh one.
    ///
    /// # Errors
    /// `DuplicateSubscription` when every requested event kind is already
    /// covered (never retried), and transport errors from the create call.
    /// A transport failure leaves the entry registered but uncommitted;
    /// [`Subscriber::renew_all`] re-submits such entries.
    pub fn subscribe<R>(&mut self, resource: &R, events: &[EventType]) -> Result<&Subscription>
    where
        R: Subscribable + ?Sized,
    {
        let resource_url = resource.resource_url();
        let index = self
            .registry
            .register(&resource_url, SubscriptionType::Streaming, events)?;
        self.submit(index)?;

        let entry = &self.registry.all()[index];
        tracing::debug!(
            resource = %entry.resource_url,
            events = %entry.change_type(),
            id = entry.id.as_deref().unwrap_or(""),
            "subscribed to resource"
        );
        Ok(entry)
    }

    /// Re-submit every tracked subscription for fresh server-side ids.
    ///
    /// Used after the server reports the subscriptions expired (HTTP 404 on
    /// the notification endpoint). Entries are re-submitted sequentially in
    /// registration order and the pass is fail-fast: the first error is
    /// returned immediately, entries after it keep their previous ids.
    pub fn renew_all(&mut self) -> Result<Vec<Subscription>> {
        tracing::info!(count = self.registry.len(), "renewing subscriptions");
        for index in 0..self.registry.len() {
            self.submit(index)?;
        }
        tracing::info!("subscriptions renewed");
        Ok(self.registry.all().to_vec())
    }

    /// Serialize and POST one registry entry, committing the response.
    fn submit(&mut self, index: usize) -> Result<()> {
        let entry = &self.registry.all()[index];
        let body = json!({
            "@odata.type": self.namespace.subscription(entry.kind),
            "Resource": entry.resource_url,
            "ChangeType": entry.change_type(),
        });

        let url = format!("{}{}", self.base_url, SUBSCRIPTIONS_ENDPOINT);
        let payload = match self.connection.post(&url, &body) {
            Ok(payload) => payload,
            Err(e) => {
                if e.status_code() == Some(429) {
                    tracing::warn!("subscription request was rate limited by the server");
                }
                return Err(NotificationError::Transport(e));
            }
        };

        self.registry.commit(index, payload)
    }

    /// All tracked subscriptions, in registration order.
    pub fn subscriptions(&self) -> &[Subscription] {
        self.registry.all()
    }

    /// The registry of tracked subscriptions.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// The mailbox API root this subscriber talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The protocol namespace the mailbox is served under.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub(crate) fn connection(&self) -> &C {
        &self.connection
    }

    pub(crate) fn notifications_url(&self) -> String {
        format!("{}{}", self.base_url, NOTIFICATIONS_ENDPOINT)
    }
}
