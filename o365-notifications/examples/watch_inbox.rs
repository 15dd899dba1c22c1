//! Minimal example showing how to stream inbox notifications.
//!
//! This example demonstrates the complete notification flow:
//! 1. Builds a REST client from a bearer token
//! 2. Subscribes the mailbox inbox to created and updated messages
//! 3. Opens the streaming channel and prints each notification
//! 4. Reconnects whenever the server closes the connection
//!
//! The Outlook REST API closes each streaming connection after the
//! configured timeout, so a long-running watcher needs reconnection enabled.
//!
//! Run with: O365_TOKEN=<bearer token> cargo run --example watch_inbox

use o365_notifications::{
    ChannelConfig, EventChannel, EventType, MailFolder, Notification, NotificationHandler,
    RestClient, Subscriber,
};
use tracing_subscriber::EnvFilter;

/// Prints each notification to the terminal.
#[derive(Default)]
struct PrintHandler {
    seen: usize,
}

impl NotificationHandler for PrintHandler {
    fn process(&mut self, notification: Notification) {
        match notification {
            Notification::KeepAlive(keep_alive) => {
                println!("· keep-alive ({})", keep_alive.status);
            }
            Notification::Change(change) => {
                self.seen += 1;
                println!("→ Notification #{}:", self.seen);
                println!("  Event: {}", change.event);
                println!("  Subscription: {}", change.subscription_id);
                if let Some(sequence) = change.sequence {
                    println!("  Sequence: {}", sequence);
                }
                if let Some(resource) = &change.resource {
                    println!("  Resource: {}", resource.url);
                }
                println!();
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let token = std::env::var("O365_TOKEN")
        .map_err(|_| "set O365_TOKEN to a bearer token for the Outlook REST API")?;
    let base_url = std::env::var("O365_BASE_URL")
        .unwrap_or_else(|_| "https://outlook.office.com/api/beta/me".to_string());

    println!("Subscribing to inbox changes at {}...\n", base_url);

    let client = RestClient::with_bearer_token(token);
    let mut subscriber = Subscriber::new(client, base_url.as_str());

    let inbox = MailFolder::inbox(base_url.as_str());
    let subscription =
        subscriber.subscribe(&inbox, &[EventType::Created, EventType::Updated])?;
    println!(
        "✓ Subscription established (id: {})\n",
        subscription.id.as_deref().unwrap_or("?")
    );

    println!("Listening for notifications (Ctrl-C to stop)...\n");

    let config = ChannelConfig {
        reconnect_on_expiry: true,
        ..ChannelConfig::default()
    };
    let mut handler = PrintHandler::default();
    EventChannel::with_config(&mut subscriber, config).open(&mut handler)?;

    println!("Server ended the channel. Goodbye!");
    Ok(())
}
