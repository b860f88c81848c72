//! Remote (HTTP) query integration tests.

use super::common::test_config;
use pretty_assertions::assert_eq;
use scout_query::client::QueryClient;
use scout_query::config::ClientConfig;
use scout_query::error::FailureKind;
use scout_query::query::{QueryRequest, RoutingTarget};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_client(server: &MockServer, configure: impl FnOnce(&mut ClientConfig)) -> QueryClient {
    let mut config = test_config(Path::new("/nonexistent/analytics.db"), &server.uri());
    configure(&mut config);
    QueryClient::from_config(config).unwrap()
}

fn remote(text: &str) -> QueryRequest {
    QueryRequest::new(text).with_target(RoutingTarget::Remote)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn test_remote_success_with_shape_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"query": "SELECT id FROM stores", "params": [7]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "s1"}, {"id": "s2"}],
            "columns": ["id"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = remote_client(&server, |_| {});
    let result = client
        .execute_query(remote("SELECT id FROM stores").with_parameters(vec![json!(7)]))
        .await;

    assert!(result.succeeded(), "{:?}", result.failure_message());
    let metadata = result.metadata().unwrap();
    assert_eq!(metadata.row_count, 2);
    assert_eq!(metadata.columns, vec!["id".to_string()]);
}

#[tokio::test]
async fn test_remote_without_shape_metadata_still_has_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"n": 1}, {"n": 2}, {"n": 3}]})),
        )
        .mount(&server)
        .await;

    let result = remote_client(&server, |_| {})
        .execute_query(remote("SELECT n FROM numbers"))
        .await;

    assert!(result.succeeded());
    let metadata = result.metadata().unwrap();
    assert_eq!(metadata.row_count, 3);
    assert!(metadata.columns.is_empty());
}

#[tokio::test]
async fn test_missing_credential_sends_empty_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.api_key = None)
        .execute_query(remote("SELECT 1"))
        .await;
    assert!(result.succeeded());

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap().trim(), "Bearer");
}

#[tokio::test]
async fn test_timeout_on_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = remote_client(&server, |c| {
        c.timeout_ms = 50;
        c.max_retries = 3;
    });
    let result = client.execute_query(remote("SELECT 1")).await;

    assert!(!result.succeeded());
    assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
    let message = result.failure_message().unwrap();
    assert!(message.contains("timeout"), "{message}");
    assert!(message.contains("3 attempt"), "{message}");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_success_on_final_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.max_retries = 3)
        .execute_query(remote("SELECT 1"))
        .await;

    assert!(result.succeeded(), "{:?}", result.failure_message());
    assert_eq!(result.metadata().unwrap().row_count, 1);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.max_retries = 2)
        .execute_query(remote("SELECT 1"))
        .await;

    assert!(!result.succeeded());
    assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
    assert!(result.failure_message().unwrap().contains("502"));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_explicit_rejection_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "syntax error near FROM"})),
        )
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.max_retries = 3)
        .execute_query(remote("SELECT FROM"))
        .await;

    assert!(!result.succeeded());
    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteRejection));
    let message = result.failure_message().unwrap();
    assert!(message.contains("rejected"));
    assert!(message.contains("syntax error near FROM"));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_rejection_after_transient_failure_stops_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad params"})))
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.max_retries = 5)
        .execute_query(remote("SELECT ?"))
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteRejection));
    assert!(result.failure_message().unwrap().contains("bad params"));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_request_timeout_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(408))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .mount(&server)
        .await;

    let result = remote_client(&server, |c| c.max_retries = 3)
        .execute_query(remote("SELECT 1"))
        .await;

    assert!(result.succeeded(), "{:?}", result.failure_message());
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_error_field_in_ok_response_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": "no such table: stores"})),
        )
        .mount(&server)
        .await;

    let result = remote_client(&server, |_| {})
        .execute_query(remote("SELECT * FROM stores"))
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteRejection));
    assert!(result.rows().is_none());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_malformed_payload_is_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = remote_client(&server, |_| {})
        .execute_query(remote("SELECT 1"))
        .await;

    assert!(!result.succeeded());
    assert!(result
        .failure_message()
        .unwrap()
        .contains("malformed response payload"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    // Nothing listens on the discard port
    let mut config = test_config(Path::new("/nonexistent/analytics.db"), "http://127.0.0.1:9");
    config.max_retries = 2;
    let client = QueryClient::from_config(config).unwrap();

    let result = client.execute_query(remote("SELECT 1")).await;

    assert!(!result.succeeded());
    assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
    let message = result.failure_message().unwrap();
    assert!(message.contains("transport"), "{message}");
    assert!(message.ends_with("(gave up after 2 attempt(s))"), "{message}");
}
