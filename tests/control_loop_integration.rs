//! End-to-end control loop tests: mock application, file-backed cooldown.

mod common;

use common::{scaleit_config, status_body, REPLICAS_PATH, STATUS_PATH};
use scaleit::control::{ControlLoop, CycleOutcome};
use scaleit::cooldown::CooldownTracker;
use scaleit::engine::ScalingDecision;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_status(server: &MockServer, cpu: f64, replicas: u32) {
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(cpu, replicas)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scale_out_updates_replicas_and_records_cooldown() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.80, 5).await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .and(body_json(serde_json::json!({"replicas": 7})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = scaleit_config(&mock_server, state_dir.path());
    let control = ControlLoop::from_config(&config).unwrap();

    assert_eq!(
        control.run_cycle().await,
        CycleOutcome::Applied {
            decision: ScalingDecision::ScaleOut(7)
        }
    );

    let stamp = std::fs::read_to_string(&config.engine.cooldown_lock_file).unwrap();
    assert!(stamp.trim().parse::<f64>().unwrap() > 0.0);
    assert!(control.cooldown().is_cooling_down());
}

#[tokio::test]
async fn test_scale_in_scenario() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.20, 10).await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .and(body_json(serde_json::json!({"replicas": 4})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = scaleit_config(&mock_server, state_dir.path());
    config.scaling.min_replicas = 1;
    let control = ControlLoop::from_config(&config).unwrap();

    assert_eq!(
        control.run_cycle().await.decision(),
        ScalingDecision::ScaleIn(4)
    );
}

#[tokio::test]
async fn test_recent_action_blocks_update() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.95, 5).await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = scaleit_config(&mock_server, state_dir.path());
    CooldownTracker::file(&config.engine.cooldown_lock_file, 300).record_action();

    let control = ControlLoop::from_config(&config).unwrap();
    assert_eq!(control.run_cycle().await, CycleOutcome::Steady);
}

#[tokio::test]
async fn test_dry_run_sends_no_update() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.80, 5).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = scaleit_config(&mock_server, state_dir.path());
    config.engine.dry_run = true;
    let control = ControlLoop::from_config(&config).unwrap();

    assert_eq!(
        control.run_cycle().await,
        CycleOutcome::Planned {
            decision: ScalingDecision::ScaleOut(7)
        }
    );
    assert!(!config.engine.cooldown_lock_file.exists());
}

#[tokio::test]
async fn test_rejected_update_leaves_cooldown_clear() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.80, 5).await;

    Mock::given(method("PUT"))
        .and(path(REPLICAS_PATH))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = scaleit_config(&mock_server, state_dir.path());
    let control = ControlLoop::from_config(&config).unwrap();

    assert_eq!(control.run_cycle().await.label(), "not_confirmed");
    assert!(!control.cooldown().is_cooling_down());
}

#[tokio::test]
async fn test_unreachable_status_skips_cycle() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = scaleit_config(&mock_server, state_dir.path());
    let control = ControlLoop::from_config(&config).unwrap();

    assert_eq!(control.run_cycle().await.label(), "skipped");
}

#[tokio::test]
async fn test_loop_runs_until_cancelled() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();
    mount_status(&mock_server, 0.60, 5).await;

    let config = scaleit_config(&mock_server, state_dir.path());
    let control = ControlLoop::from_config(&config)
        .unwrap()
        .with_interval(Duration::from_millis(20));

    let cancel = CancellationToken::new();
    let handle = control.start(cancel.clone());

    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("control loop did not stop")
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.len() >= 2);
}

#[tokio::test]
async fn test_cancel_interrupts_backoff_wait() {
    let mock_server = MockServer::start().await;
    let state_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut config = scaleit_config(&mock_server, state_dir.path());
    config.retry.retry_after_seconds = 60.0;
    let control = ControlLoop::from_config(&config).unwrap();

    let cancel = CancellationToken::new();
    let handle = control.start(cancel.clone());

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("backoff wait was not interrupted")
        .unwrap();
}
