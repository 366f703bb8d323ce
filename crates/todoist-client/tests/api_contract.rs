//! Todoist REST contract tests
//!
//! Drives the real reqwest transport against a wiremock server and checks the
//! request shape and the error classification of each response class.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use taskdeck_core::{Due, FixedClock, Task};
use todoist_client::{ApiKey, FetchError, TodoistClient, TodoistConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "0123456789abcdef0123456789abcdef01234567";

fn client_for(server: &MockServer) -> TodoistClient {
    let config = TodoistConfig::new(ApiKey::new(KEY).unwrap()).with_base_url(server.uri());
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 9, 8, 0, 0).unwrap()));
    TodoistClient::with_reqwest(config, clock)
}

// ────────────────────────────────────────────────────────────────────────────
// Fetch
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_bearer_and_keeps_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", format!("Bearer {}", KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":"1","content":"Buy milk","due":"2024-01-10"},{"id":"2","content":"No due"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let set = client_for(&server).fetch_task_set(1).await.unwrap();

    assert_eq!(
        set.tasks(),
        &[
            Task::new("1", "Buy milk").with_due(Due::on(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())),
            Task::new("2", "No due"),
        ]
    );
    assert_eq!(set.generation(), 1);
}

#[tokio::test]
async fn test_rejected_key_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"bad token"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_tasks().await.unwrap_err();

    assert_eq!(err, FetchError::Unauthorized { status: 401 });
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn test_forbidden_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_tasks().await.unwrap_err();
    assert_eq!(err, FetchError::Unauthorized { status: 403 });
}

#[tokio::test]
async fn test_server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_tasks().await.unwrap_err();
    assert_eq!(err, FetchError::UnexpectedStatus { status: 500 });
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_tasks().await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("[]")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = TodoistConfig::new(ApiKey::new(KEY).unwrap())
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let client = TodoistClient::with_reqwest(config, clock);

    let err = client.fetch_tasks().await.unwrap_err();
    assert_eq!(err, FetchError::Timeout { after_ms: 200 });
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // reserve a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TodoistConfig::new(ApiKey::new(KEY).unwrap())
        .with_base_url(format!("http://{addr}"))
        .with_timeout(Duration::from_secs(5));
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let client = TodoistClient::with_reqwest(config, clock);

    let err = client.fetch_tasks().await.unwrap_err();
    assert_eq!(err.kind(), "network");
    assert!(!err.to_string().contains(KEY));
}

// ────────────────────────────────────────────────────────────────────────────
// Close
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_task_posts_to_close_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/2995104339/close"))
        .and(header("authorization", format!("Bearer {}", KEY).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).close_task("2995104339").await.unwrap();
}

#[tokio::test]
async fn test_close_unknown_task_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/missing/close"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).close_task("missing").await.unwrap_err();
    assert_eq!(err, FetchError::UnexpectedStatus { status: 404 });
}
