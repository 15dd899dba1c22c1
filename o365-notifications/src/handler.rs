//! Delivery of classified notifications to application code.

use crate::notification::Notification;

/// Receives each notification an event channel decodes.
///
/// The channel calls [`process`](NotificationHandler::process) for every
/// successfully classified object on the stream, keep-alives included, in
/// stream order. Processing happens on the thread that owns the channel, so
/// a slow handler delays decoding of the next object.
pub trait NotificationHandler {
    /// Handle one notification.
    fn process(&mut self, notification: Notification);
}

/// Handler that logs each notification and otherwise ignores it.
///
/// Useful as a placeholder while wiring up a channel, and as the simplest
/// possible example of the trait.
#[derive(Debug, Default)]
pub struct LogHandler;

impl NotificationHandler for LogHandler {
    fn process(&mut self, notification: Notification) {
        match notification {
            Notification::KeepAlive(keep_alive) => {
                tracing::debug!(status = %keep_alive.status, "keep-alive");
            }
            Notification::Change(change) => {
                tracing::debug!(
                    subscription = %change.subscription_id,
                    event = %change.event,
                    resource = change
                        .resource
                        .as_ref()
                        .map(|data| data.url.as_str())
                        .unwrap_or(""),
                    "change notification"
                );
            }
        }
    }
}
