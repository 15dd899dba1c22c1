//! Long-lived streaming channel over the notification endpoint.
//!
//! # Overview
//!
//! An [`EventChannel`] POSTs the tracked subscription ids to the mailbox's
//! notification endpoint and holds the connection open while the server
//! trickles out a JSON array of notifications. Each decoded object is
//! classified and handed to a [`NotificationHandler`]. When the server
//! closes the connection (it always does, after the configured timeout) the
//! channel either returns or reconnects, depending on configuration. A 404
//! on connect means the subscriptions expired while the channel was away;
//! the channel renews them through its [`Subscriber`] and retries.

use serde_json::json;

use crate::connection::Connection;
use crate::error::{NotificationError, Result, StreamError};
use crate::handler::NotificationHandler;
use crate::notification;
use crate::stream::{ObjectStream, DEFAULT_CHUNK_SIZE};
use crate::subscriber::Subscriber;

/// Parameters of one streaming connection.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Minutes the server holds one connection open before closing it.
    pub connection_timeout_minutes: u32,
    /// Seconds between keep-alive notifications from the server.
    pub keep_alive_interval_seconds: u32,
    /// Open a fresh connection whenever the previous one closes.
    pub reconnect_on_expiry: bool,
    /// Bytes requested per read from the response body.
    pub read_chunk_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connection_timeout_minutes: 120,
            keep_alive_interval_seconds: 5,
            reconnect_on_expiry: false,
            read_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Streams change notifications for a subscriber's subscriptions.
///
/// # Example
/// ```rust,ignore
/// use o365_notifications::prelude::*;
///
/// let mut handler = LogHandler::default();
/// EventChannel::new(&mut subscriber).open(&mut handler)?;
/// ```
pub struct EventChannel<'a, C: Connection> {
    subscriber: &'a mut Subscriber<C>,
    config: ChannelConfig,
}

impl<'a, C: Connection> EventChannel<'a, C> {
    /// Create a channel with default configuration.
    pub fn new(subscriber: &'a mut Subscriber<C>) -> Self {
        Self::with_config(subscriber, ChannelConfig::default())
    }

    /// Create a channel with explicit configuration.
    pub fn with_config(subscriber: &'a mut Subscriber<C>, config: ChannelConfig) -> Self {
        Self { subscriber, config }
    }

    /// Connect and deliver notifications until the channel ends.
    ///
    /// Blocks the calling thread. Every classified notification on the
    /// stream is passed to `handler` in stream order; malformed or
    /// unclassifiable elements are logged and skipped. Returns when the
    /// server closes the connection (immediately, or after the next close
    /// once `reconnect_on_expiry` is unset), or with the first fatal error.
    ///
    /// # Errors
    /// `NoSubscriptions` when the subscriber has nothing to stream for,
    /// transport errors from connecting or renewing, and stream errors the
    /// decoder cannot recover from.
    pub fn open(self, handler: &mut dyn NotificationHandler) -> Result<()> {
        if self.subscriber.subscriptions().is_empty() {
            return Err(NotificationError::NoSubscriptions);
        }

        let namespace = *self.subscriber.namespace();
        let url = self.subscriber.notifications_url();
        let mut subscription_ids = self.subscriber.registry().subscription_ids();

        loop {
            tracing::info!(
                subscriptions = subscription_ids.len(),
                "opening notification channel"
            );
            let body = json!({
                "ConnectionTimeoutInMinutes": self.config.connection_timeout_minutes,
                "KeepAliveNotificationIntervalInSeconds": self.config.keep_alive_interval_seconds,
                "SubscriptionIds": subscription_ids,
            });

            let reader = match self.subscriber.connection().open_stream(&url, &body) {
                Ok(Some(reader)) => reader,
                Ok(None) => {
                    tracing::warn!("server closed the notification channel without content");
                    break;
                }
                Err(e) if e.status_code() == Some(404) => {
                    tracing::info!("subscriptions expired, renewing before reconnecting");
                    self.subscriber.renew_all()?;
                    subscription_ids = self.subscriber.registry().subscription_ids();
                    continue;
                }
                Err(e) => return Err(NotificationError::Transport(e)),
            };

            tracing::debug!("notification channel connected");
            let stream = ObjectStream::with_chunk_size(reader, self.config.read_chunk_size);
            for object in stream {
                match object {
                    Ok(raw) => match notification::classify(&namespace, raw) {
                        Ok(notification) => handler.process(notification),
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping unclassifiable notification");
                        }
                    },
                    Err(StreamError::Json(e)) => {
                        tracing::warn!(error = %e, "dropping malformed stream element");
                    }
                    Err(StreamError::Interrupted(reason)) => {
                        tracing::warn!(%reason, "notification connection interrupted");
                        break;
                    }
                    Err(e) => return Err(NotificationError::Stream(e)),
                }
            }

            if !self.config.reconnect_on_expiry {
                break;
            }
            tracing::info!("connection closed, reconnecting");
        }

        tracing::info!("stopped listening for events: connection closed");
        Ok(())
    }
}
