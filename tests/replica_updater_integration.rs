//! Integration tests for replica updates against a mock orchestration API.

mod common;

use common::{app_config, fast_retry, REPLICAS_PATH};
use scaleit::client::{KeyPath, ReplicaUpdater};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_update_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"replicas": 7})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updater = ReplicaUpdater::new(&app_config(&mock_server), fast_retry(3)).unwrap();
    assert!(updater.update(7).await);
}

#[tokio::test]
async fn test_update_nests_body_by_key_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .and(body_json(serde_json::json!({"spec": {"replicas": 3}})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut app = app_config(&mock_server);
    app.read_replicas_key = KeyPath::parse("spec.replicas").unwrap();

    let updater = ReplicaUpdater::new(&app, fast_retry(3)).unwrap();
    assert!(updater.update(3).await);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let updater = ReplicaUpdater::new(&app_config(&mock_server), fast_retry(3)).unwrap();
    assert!(!updater.update(4).await);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updater = ReplicaUpdater::new(&app_config(&mock_server), fast_retry(3)).unwrap();
    assert!(!updater.update(4).await);
}

#[tokio::test]
async fn test_update_succeeds_after_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updater = ReplicaUpdater::new(&app_config(&mock_server), fast_retry(3)).unwrap();
    assert!(updater.update(5).await);
}
