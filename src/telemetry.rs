//! # Telemetry
//!
//! Metric names recorded through the `metrics` facade, plus the optional
//! Prometheus exporter. Without an installed recorder every call is a no-op.
//!
//! **Counters:**
//! - `scaleit_cycles_total{outcome}` - Control loop cycles by outcome
//! - `scaleit_scale_actions_total{direction, result}` - Replica updates sent
//! - `scaleit_api_retries_total{endpoint}` - Backoff waits taken
//!
//! **Gauges:**
//! - `scaleit_cpu_utilization` - Last sampled average CPU
//! - `scaleit_replicas_current` - Last sampled replica count
//! - `scaleit_replicas_desired` - Last decided replica count
//!
//! **Histograms:**
//! - `scaleit_api_request_duration_seconds{endpoint}` - Single request latency

use crate::config::TelemetryConfig;
use crate::engine::Sample;
use metrics_exporter_prometheus::PrometheusBuilder;

pub const CYCLES_TOTAL: &str = "scaleit_cycles_total";
pub const SCALE_ACTIONS_TOTAL: &str = "scaleit_scale_actions_total";
pub const API_RETRIES_TOTAL: &str = "scaleit_api_retries_total";
pub const CPU_UTILIZATION: &str = "scaleit_cpu_utilization";
pub const REPLICAS_CURRENT: &str = "scaleit_replicas_current";
pub const REPLICAS_DESIRED: &str = "scaleit_replicas_desired";
pub const API_REQUEST_DURATION_SECONDS: &str = "scaleit_api_request_duration_seconds";

/// Endpoint label for the status read call
pub const STATUS_ENDPOINT: &str = "status";
/// Endpoint label for the replica update call
pub const REPLICAS_ENDPOINT: &str = "replicas";

/// Install the Prometheus exporter when enabled.
///
/// Must run inside a tokio runtime; the exporter serves `/metrics` on its own listener.
pub fn init_metrics(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.enabled {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(config.listen)
        .install()?;

    tracing::info!(listen = %config.listen, "Prometheus exporter listening");
    Ok(())
}

/// Publish the gauges for a fresh sample.
pub fn record_sample(sample: &Sample) {
    metrics::gauge!(CPU_UTILIZATION).set(sample.cpu_utilization);
    metrics::gauge!(REPLICAS_CURRENT).set(sample.replica_count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_exporter_is_noop() {
        let config = TelemetryConfig::default();
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_metric_names_are_prometheus_safe() {
        for name in [
            CYCLES_TOTAL,
            SCALE_ACTIONS_TOTAL,
            API_RETRIES_TOTAL,
            CPU_UTILIZATION,
            REPLICAS_CURRENT,
            REPLICAS_DESIRED,
            API_REQUEST_DURATION_SECONDS,
        ] {
            assert!(name.starts_with("scaleit_"));
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
