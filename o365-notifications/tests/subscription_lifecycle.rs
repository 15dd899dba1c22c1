//! Integration tests for subscription creation, widening, and renewal.
//!
//! These tests drive a `Subscriber` against a scripted connection and verify:
//! - The exact JSON bodies posted to the subscription endpoint
//! - Deduplication and widening of per-resource subscriptions
//! - Commit semantics of server-issued subscription ids
//! - Renewal of every tracked subscription, including after failed creates


use mock_connection::{MockConnection, PostReply};
use o365_notifications::{
    ApiProtocol, EventType, MailFolder, NotificationError, RestError, Subscriber,
};
use serde_json::json;

const BASE_URL: &str = "https://outlook.office.com/api/beta/me";

fn subscriber_for(connection: &MockConnection) -> Subscriber<MockConnection> {
    Subscriber::new(connection.clone(), BASE_URL)
}

#[test]
fn test_subscribe_posts_streaming_request() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("RUF3MQ==");
    let mut subscriber = subscriber_for(&connection);

    let subscription = subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect("subscribe failed");

    assert_eq!(subscription.id.as_deref(), Some("RUF3MQ=="));

    let posts = connection.posts();
    assert_eq!(posts.len(), 1);
    let (url, body) = &posts[0];
    assert_eq!(url, "https://outlook.office.com/api/beta/me/subscriptions");
    assert_eq!(
        *body,
        json!({
            "@odata.type": "#Microsoft.OutlookServices.StreamingSubscription",
            "Resource": "https://outlook.office.com/api/beta/me/mailfolders('inbox')/messages",
            "ChangeType": "Created",
        })
    );
}

#[test]
fn test_subscribe_joins_event_kinds() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("RUF3MQ==");
    let mut subscriber = subscriber_for(&connection);

    subscriber
        .subscribe(
            &MailFolder::root(BASE_URL),
            &[EventType::Created, EventType::Updated, EventType::Deleted],
        )
        .expect("subscribe failed");

    let body = &connection.posts()[0].1;
    assert_eq!(body["ChangeType"], "Created,Updated,Deleted");
    assert_eq!(
        body["Resource"],
        "https://outlook.office.com/api/beta/me/messages"
    );
}

#[test]
fn test_subscribe_accepts_raw_resource_urls() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("RUF3MQ==");
    let mut subscriber = subscriber_for(&connection);

    subscriber
        .subscribe(
            "https://outlook.office.com/api/beta/me/events",
            &[EventType::Created],
        )
        .expect("subscribe failed");

    let body = &connection.posts()[0].1;
    assert_eq!(
        body["Resource"],
        "https://outlook.office.com/api/beta/me/events"
    );
}

#[test]
fn test_subscribe_rejects_duplicate_resource() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("RUF3MQ==");
    let mut subscriber = subscriber_for(&connection);
    let inbox = MailFolder::inbox(BASE_URL);

    subscriber
        .subscribe(&inbox, &[EventType::Created])
        .expect("first subscribe failed");
    let error = subscriber
        .subscribe(&inbox, &[EventType::Created])
        .expect_err("duplicate subscribe succeeded");

    match error {
        NotificationError::DuplicateSubscription { resource } => {
            assert!(resource.contains("mailfolders('inbox')"));
        }
        other => panic!("Expected DuplicateSubscription, got {:?}", other),
    }
    // Nothing further was posted for the rejected request
    assert_eq!(connection.post_count(), 1);
    assert_eq!(subscriber.subscriptions().len(), 1);
}

#[test]
fn test_subscribe_widens_existing_subscription() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("sub-a");
    connection.queue_subscribe_ok("sub-b");
    let mut subscriber = subscriber_for(&connection);
    let inbox = MailFolder::inbox(BASE_URL);

    subscriber
        .subscribe(&inbox, &[EventType::Created])
        .expect("first subscribe failed");
    let widened = subscriber
        .subscribe(&inbox, &[EventType::Updated])
        .expect("widening subscribe failed");

    assert_eq!(widened.events, vec![EventType::Created, EventType::Updated]);
    assert_eq!(widened.id.as_deref(), Some("sub-b"));
    assert_eq!(subscriber.subscriptions().len(), 1);

    // The second create carries the full widened event set
    let body = &connection.posts()[1].1;
    assert_eq!(body["ChangeType"], "Created,Updated");
}

#[test]
fn test_subscribe_surfaces_transport_errors() {
    let connection = MockConnection::new();
    connection.queue_post(PostReply::Error(RestError::Status {
        code: 403,
        body: "forbidden".to_string(),
    }));
    let mut subscriber = subscriber_for(&connection);

    let error = subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect_err("subscribe succeeded against a 403");

    match error {
        NotificationError::Transport(e) => assert_eq!(e.status_code(), Some(403)),
        other => panic!("Expected Transport, got {:?}", other),
    }
}

#[test]
fn test_failed_create_is_retried_by_renew_all() {
    let connection = MockConnection::new();
    connection.queue_post(PostReply::Error(RestError::Status {
        code: 503,
        body: String::new(),
    }));
    let mut subscriber = subscriber_for(&connection);
    let inbox = MailFolder::inbox(BASE_URL);

    subscriber
        .subscribe(&inbox, &[EventType::Created])
        .expect_err("subscribe succeeded against a 503");

    // The entry stays registered without an id
    assert_eq!(subscriber.subscriptions().len(), 1);
    assert!(subscriber.subscriptions()[0].id.is_none());

    connection.queue_subscribe_ok("sub-late");
    let renewed = subscriber.renew_all().expect("renewal failed");

    assert_eq!(renewed.len(), 1);
    assert_eq!(renewed[0].id.as_deref(), Some("sub-late"));
}

#[test]
fn test_subscribe_rejects_response_without_id() {
    let connection = MockConnection::new();
    connection.queue_post(PostReply::Payload(json!({"Status": "OK"})));
    let mut subscriber = subscriber_for(&connection);

    let error = subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect_err("subscribe accepted a response without an id");

    assert!(matches!(error, NotificationError::UnexpectedResponse(_)));
}

#[test]
fn test_renew_all_resubmits_in_registration_order() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("inbox-1");
    connection.queue_subscribe_ok("events-1");
    let mut subscriber = subscriber_for(&connection);

    subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect("inbox subscribe failed");
    subscriber
        .subscribe(
            "https://outlook.office.com/api/beta/me/events",
            &[EventType::Updated],
        )
        .expect("events subscribe failed");

    connection.queue_subscribe_ok("inbox-2");
    connection.queue_subscribe_ok("events-2");
    let renewed = subscriber.renew_all().expect("renewal failed");

    assert_eq!(renewed.len(), 2);
    assert_eq!(renewed[0].id.as_deref(), Some("inbox-2"));
    assert_eq!(renewed[1].id.as_deref(), Some("events-2"));

    // Renewal posts repeat the original request bodies, inbox first
    let posts = connection.posts();
    assert_eq!(posts.len(), 4);
    assert_eq!(posts[2].1["Resource"], posts[0].1["Resource"]);
    assert_eq!(posts[3].1["Resource"], posts[1].1["Resource"]);
}

#[test]
fn test_renew_all_stops_at_first_failure() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("inbox-1");
    connection.queue_subscribe_ok("events-1");
    let mut subscriber = subscriber_for(&connection);

    subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect("inbox subscribe failed");
    subscriber
        .subscribe(
            "https://outlook.office.com/api/beta/me/events",
            &[EventType::Updated],
        )
        .expect("events subscribe failed");

    connection.queue_post(PostReply::Error(RestError::Status {
        code: 500,
        body: String::new(),
    }));
    subscriber.renew_all().expect_err("renewal succeeded");

    // Only the first entry was attempted; the second keeps its id
    assert_eq!(connection.post_count(), 3);
    assert_eq!(subscriber.subscriptions()[1].id.as_deref(), Some("events-1"));
}

#[test]
fn test_graph_protocol_changes_namespace() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("graph-1");
    let mut subscriber =
        Subscriber::with_protocol(connection.clone(), BASE_URL, ApiProtocol::Graph);

    subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect("subscribe failed");

    let body = &connection.posts()[0].1;
    assert_eq!(body["@odata.type"], "#Microsoft.Graph.StreamingSubscription");
}

#[test]
fn test_base_url_trailing_slash_is_trimmed() {
    let connection = MockConnection::new();
    connection.queue_subscribe_ok("sub-1");
    let mut subscriber = Subscriber::new(connection.clone(), format!("{}/", BASE_URL));

    subscriber
        .subscribe(&MailFolder::inbox(BASE_URL), &[EventType::Created])
        .expect("subscribe failed");

    assert_eq!(
        connection.posts()[0].0,
        "https://outlook.office.com/api/beta/me/subscriptions"
    );
}
