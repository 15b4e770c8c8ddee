//! End-to-end tests for the webhook notification pipeline: registration over
//! HTTP, asynchronous challenge verification against stub callback endpoints,
//! and signed fan-out of published messages.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use hookbus::broker::Broker;
use hookbus::config::NotifySettings;
use hookbus::notify::NotificationManager;
use hookbus::server::router;

/// Stub webhook endpoint: echoes the challenge back for verification
/// requests and accepts notifications with a plain 200.
struct CallbackEndpoint;

impl Respond for CallbackEndpoint {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let message_type = request
            .headers
            .get("Notification-Message-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if message_type == "webhook_callback_verification" {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let challenge = body["challenge"].as_str().unwrap_or_default().to_string();
            return ResponseTemplate::new(200).set_body_string(challenge);
        }

        ResponseTemplate::new(200)
    }
}

async fn start_callback_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(CallbackEndpoint)
        .mount(&server)
        .await;
    server
}

fn build_pipeline(topics: &[&str]) -> (Arc<Broker>, Arc<NotificationManager>) {
    let settings = NotifySettings {
        topics: topics.iter().map(|t| t.to_string()).collect(),
        request_timeout_secs: 5,
    };

    let broker = Arc::new(Broker::new());
    let manager = Arc::new(NotificationManager::new(&broker, &settings).unwrap());
    manager.start();
    (broker, manager)
}

/// Requests received by the stub, filtered by message type.
async fn requests_by_type(server: &MockServer, message_type: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| {
            r.headers
                .get("Notification-Message-Type")
                .and_then(|v| v.to_str().ok())
                == Some(message_type)
        })
        .collect()
}

/// Polls until the stub has seen at least one request of the given type.
async fn wait_for_request(server: &MockServer, message_type: &str, what: &str) {
    for _ in 0..100 {
        if !requests_by_type(server, message_type).await.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("timed out waiting for {what}");
}

async fn serve_api(manager: Arc<NotificationManager>) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(manager);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn end_to_end_register_verify_publish_notify() {
    let callback = start_callback_endpoint().await;
    let (broker, manager) = build_pipeline(&["user.changed"]);
    let api_addr = serve_api(Arc::clone(&manager)).await;

    let http = reqwest::Client::new();
    let resp = http
        .post(format!("http://{api_addr}/subscriptions"))
        .json(&json!({
            "type": "user.changed",
            "callback": callback.uri(),
            "secret": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 202);
    let registered: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(registered["type"], "user.changed");
    assert_eq!(registered["status"], "verification_pending");
    assert!(!registered["id"].as_str().unwrap().is_empty());

    // The verification handshake runs asynchronously.
    wait_for_request(&callback, "webhook_callback_verification", "verification request").await;

    broker.publish("user.changed", json!({"id": 42, "name": "alice"}));

    wait_for_request(&callback, "notification", "notification delivery").await;

    let notifications = requests_by_type(&callback, "notification").await;
    assert_eq!(notifications.len(), 1);
    let delivery = &notifications[0];

    assert!(delivery.headers.contains_key("Notification-Message-Id"));
    assert!(delivery.headers.contains_key("Notification-Message-Timestamp"));
    assert!(delivery.headers.contains_key("Notification-Message-Signature"));

    let body: serde_json::Value = serde_json::from_slice(&delivery.body).unwrap();
    assert_eq!(body["data"], json!({"id": 42, "name": "alice"}));
    assert!(body.get("createdAt").is_some());
}

#[tokio::test]
async fn end_to_end_fan_out_reaches_every_subscriber() {
    let (broker, manager) = build_pipeline(&["user.changed"]);

    let mut callbacks = Vec::new();
    for _ in 0..4 {
        let callback = start_callback_endpoint().await;
        manager
            .subscribe("user.changed", &callback.uri(), None)
            .await
            .unwrap();
        callbacks.push(callback);
    }

    // All four must complete verification before the publish.
    for callback in &callbacks {
        wait_for_request(callback, "webhook_callback_verification", "verification request").await;
    }
    // The worker promotes a subscriber right after the stub answers; a short
    // settle keeps the publish from racing the last promotion.
    tokio::time::sleep(Duration::from_millis(200)).await;

    broker.publish("user.changed", json!({"seq": 1}));

    for callback in &callbacks {
        wait_for_request(callback, "notification", "notification delivery").await;
        let notifications = requests_by_type(callback, "notification").await;
        assert_eq!(notifications.len(), 1);
    }
}

#[tokio::test]
async fn end_to_end_failed_verification_receives_no_notifications() {
    let (broker, manager) = build_pipeline(&["user.changed"]);

    let rejecting = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-the-challenge"))
        .mount(&rejecting)
        .await;

    let verified = start_callback_endpoint().await;

    manager
        .subscribe("user.changed", &rejecting.uri(), None)
        .await
        .unwrap();
    manager
        .subscribe("user.changed", &verified.uri(), None)
        .await
        .unwrap();

    // The worker is serial, so a verified second subscriber proves the
    // pipeline already processed and rejected the first one.
    wait_for_request(
        &verified,
        "webhook_callback_verification",
        "verification of the second subscriber",
    )
    .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    broker.publish("user.changed", json!("event"));

    wait_for_request(&verified, "notification", "notification to the verified subscriber").await;

    assert!(requests_by_type(&rejecting, "notification").await.is_empty());
}

#[tokio::test]
async fn end_to_end_unknown_topic_is_rejected_over_http() {
    let (_broker, manager) = build_pipeline(&["user.changed"]);
    let api_addr = serve_api(manager).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{api_addr}/subscriptions"))
        .json(&json!({"type": "unknown.topic", "callback": "http://127.0.0.1:1/cb"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "unknown_topic");

    let health = reqwest::Client::new()
        .get(format!("http://{api_addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
}
