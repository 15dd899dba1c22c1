//! # O365 Notifications
//!
//! Streaming change notifications for Office 365 Outlook mailboxes over the
//! Outlook REST API.
//!
//! ## Overview
//!
//! The Outlook REST API can push mailbox change notifications over a single
//! long-lived HTTP response: the client subscribes one or more resources
//! (folders, messages, events), opens the notification endpoint, and the
//! server writes a JSON array of notification objects to the open response
//! body, one element at a time, for up to two hours per connection. This
//! crate implements that protocol end to end with a fully synchronous API.
//!
//! ## Key Features
//!
//! - **Sync-First API**: All methods are blocking - no async runtime required
//! - **Subscription Management**: Create, track, widen, and renew streaming subscriptions per resource
//! - **Incremental Decoding**: Notifications are decoded and delivered as they arrive, not when the array ends
//! - **Fault Tolerance**: Expired subscriptions are renewed on 404, malformed elements are logged and skipped
//! - **Reconnection**: Optionally reopens the channel whenever the server closes it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use o365_notifications::prelude::*;
//!
//! // Authenticate against the Outlook REST API
//! let client = RestClient::with_bearer_token(token);
//! let base_url = "https://outlook.office.com/api/beta/me";
//! let mut subscriber = Subscriber::new(client, base_url);
//!
//! // Subscribe the inbox to new and changed messages
//! let inbox = MailFolder::inbox(base_url);
//! subscriber.subscribe(&inbox, &[EventType::Created, EventType::Updated])?;
//!
//! // Stream notifications until the server closes the connection
//! let mut handler = LogHandler::default();
//! EventChannel::new(&mut subscriber).open(&mut handler)?;
//! ```
//!
//! ## Architecture
//!
//! Notifications flow through three layers:
//!
//! 1. **Subscriber**: registers resources and POSTs subscription requests, keeping the server-issued ids
//! 2. **EventChannel**: opens the notification endpoint and holds the response body open
//! 3. **ObjectStream**: scans the body incrementally and yields one JSON object per notification
//!
//! Classified notifications are handed to a [`NotificationHandler`] in stream
//! order, keep-alives included.

pub mod channel;
pub mod connection;
pub mod error;
pub mod handler;
pub mod namespace;
pub mod notification;
pub mod resource;
pub mod stream;
pub mod subscriber;
pub mod types;

// Re-export main types for convenience
pub use channel::{ChannelConfig, EventChannel};
pub use connection::Connection;
pub use error::{ClassificationError, NotificationError, Result, StreamError};
pub use handler::{LogHandler, NotificationHandler};
pub use namespace::{ApiProtocol, Namespace};
pub use notification::{ChangeNotification, KeepAlive, Notification, ResourceData};
pub use resource::{MailFolder, Subscribable};
pub use stream::ObjectStream;
pub use subscriber::{Subscriber, SubscriptionRegistry};
pub use types::{EventType, Subscription, SubscriptionType};

// Re-export the transport types from the dependency
pub use rest_client::{RestClient, RestError};

/// Prelude module for convenient imports
///
/// Use this to import the most commonly used types and traits:
///
/// ```rust
/// use o365_notifications::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ApiProtocol, ChannelConfig, EventChannel, EventType, LogHandler, MailFolder, Notification,
        NotificationError, NotificationHandler, RestClient, Result, Subscribable, Subscriber,
        SubscriptionType,
    };
}
