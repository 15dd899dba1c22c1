//! Protocol namespaces and `@odata.type` token construction.
//!
//! The mailbox API is served under two flavors with different type
//! namespaces. Every subscribe request and every streamed object carries an
//! `@odata.type` discriminator built from the flavor's base namespace, so
//! all token construction lives here.

use crate::types::SubscriptionType;

/// API flavor a mailbox is served over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProtocol {
    /// Outlook REST API
    Outlook,
    /// Microsoft Graph API
    Graph,
}

impl ApiProtocol {
    /// Base namespace for this flavor's `@odata.type` tokens.
    pub fn base_namespace(&self) -> &'static str {
        match self {
            ApiProtocol::Outlook => "#Microsoft.OutlookServices",
            ApiProtocol::Graph => "#Microsoft.Graph",
        }
    }
}

/// Builds the `@odata.type` tokens of one protocol flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    base: &'static str,
}

impl Namespace {
    /// Create the namespace for the given protocol.
    pub fn new(protocol: ApiProtocol) -> Self {
        Self {
            base: protocol.base_namespace(),
        }
    }

    /// Token of a change notification object.
    pub fn notification(&self) -> String {
        format!("{}.Notification", self.base)
    }

    /// Token of a keep-alive heartbeat object.
    pub fn keep_alive(&self) -> String {
        format!("{}.KeepAliveNotification", self.base)
    }

    /// Token of a subscription of the given kind.
    pub fn subscription(&self, kind: SubscriptionType) -> String {
        match kind {
            SubscriptionType::Push => format!("{}.PushSubscription", self.base),
            SubscriptionType::Streaming => format!("{}.StreamingSubscription", self.base),
        }
    }

    /// Resource data token of a mailbox message.
    pub fn message(&self) -> String {
        format!("{}.Message", self.base)
    }

    /// Resource data token of a calendar event.
    pub fn event(&self) -> String {
        format!("{}.Event", self.base)
    }

    /// Resource data token of a calendar.
    pub fn calendar(&self) -> String {
        format!("{}.Calendar", self.base)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(ApiProtocol::Outlook)
    }
}
