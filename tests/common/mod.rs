//! Shared test utilities for scaleit integration tests.
//!
//! Builds configuration pointing at a wiremock server with retry waits short
//! enough for tests.

#![allow(dead_code)]

use scaleit::client::KeyPath;
use scaleit::config::{AppConfig, RetryConfig, ScaleitConfig};
use scaleit::retry::RetryPolicy;
use std::collections::BTreeSet;
use std::path::Path;
use wiremock::MockServer;

pub const STATUS_PATH: &str = "/app/status";
pub const REPLICAS_PATH: &str = "/app/replicas";

/// App section aimed at `server`.
pub fn app_config(server: &MockServer) -> AppConfig {
    let addr = server.address();
    AppConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        secure: false,
        read_url: STATUS_PATH.to_string(),
        replica_update_url: REPLICAS_PATH.to_string(),
        read_metrics_key: KeyPath::parse("cpu.highPriority").unwrap(),
        read_replicas_key: KeyPath::parse("replicas").unwrap(),
        connection_timeout_seconds: 2.0,
    }
}

/// Linear, jitter-free retries of 10ms, 5xx and connection errors retryable.
pub fn fast_retry_config(attempts: u32) -> RetryConfig {
    RetryConfig {
        api_retries_count: attempts,
        retry_after_seconds: 0.01,
        retry_exponentially: false,
        retry_add_randomness: false,
        retry_on_http_codes: BTreeSet::from([5]),
        retry_on_connection_error: true,
    }
}

pub fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::from(&fast_retry_config(attempts))
}

/// Full configuration for a control loop against `server`, with cooldown state in `state_dir`.
pub fn scaleit_config(server: &MockServer, state_dir: &Path) -> ScaleitConfig {
    let mut config = ScaleitConfig::default();
    config.app = app_config(server);
    config.retry = fast_retry_config(3);
    config.scaling.target_avg_cpu_utilization_for_scale_out = 0.60;
    config.scaling.target_avg_cpu_utilization_for_scale_in = 0.30;
    config.scaling.min_replicas = 2;
    config.scaling.max_replicas = 10;
    config.scaling.cool_down_time_seconds = 300;
    config.engine.cooldown_lock_file = state_dir.join("scaleit.cooldown");
    config
}

/// Status body in the default key layout.
pub fn status_body(cpu: f64, replicas: u32) -> serde_json::Value {
    serde_json::json!({
        "cpu": {"highPriority": cpu},
        "replicas": replicas
    })
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
