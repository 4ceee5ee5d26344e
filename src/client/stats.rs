//! Status endpoint client.

use super::{ApiError, KeyPath, MetricsSource};
use crate::config::AppConfig;
use crate::engine::Sample;
use crate::retry::RetryPolicy;
use crate::telemetry;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Reads average CPU utilization and replica count from the status endpoint.
pub struct MetricsClient {
    client: reqwest::Client,
    url: String,
    cpu_key: KeyPath,
    replicas_key: KeyPath,
    timeout: Duration,
    retry: RetryPolicy,
}

impl MetricsClient {
    /// Create a client with its own connection pool.
    pub fn new(app: &AppConfig, retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(app.connection_timeout())
            .build()?;
        Ok(Self::with_client(app, retry, client))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(app: &AppConfig, retry: RetryPolicy, client: reqwest::Client) -> Self {
        Self {
            client,
            url: app.status_url(),
            cpu_key: app.read_metrics_key.clone(),
            replicas_key: app.read_replicas_key.clone(),
            timeout: app.connection_timeout(),
            retry,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one sample, retrying per the policy.
    pub async fn sample(&self) -> Result<Sample, ApiError> {
        let result = self
            .retry
            .execute(telemetry::STATUS_ENDPOINT, &self.url, |attempt| {
                self.fetch_once(attempt)
            })
            .await;

        match &result {
            Ok(sample) => tracing::info!(
                url = %self.url,
                cpu_utilization = sample.cpu_utilization,
                replicas = sample.replica_count,
                "Sampled application status"
            ),
            Err(error) => tracing::error!(
                url = %self.url,
                kind = error.kind(),
                error = %error,
                "Unable to read application status, giving up"
            ),
        }
        result
    }

    async fn fetch_once(&self, attempt: u32) -> Result<Sample, ApiError> {
        let start = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&self.url, e, self.timeout))?;

        metrics::histogram!(telemetry::API_REQUEST_DURATION_SECONDS,
            "endpoint" => telemetry::STATUS_ENDPOINT
        )
        .record(start.elapsed().as_secs_f64());

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ApiError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&self.url, e, self.timeout))?;
        let data: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        match parse_sample(&data, &self.cpu_key, &self.replicas_key) {
            Ok(sample) => {
                tracing::debug!(
                    url = %self.url,
                    attempt,
                    status = status.as_u16(),
                    cpu_utilization = sample.cpu_utilization,
                    replicas = sample.replica_count,
                    "Status response parsed"
                );
                Ok(sample)
            }
            Err(field) => {
                tracing::error!(
                    url = %self.url,
                    status = status.as_u16(),
                    field = %field,
                    "Avg CPU/Replicas: non-supported value returned"
                );
                tracing::debug!(url = %self.url, response = %body, "Raw status response");
                Err(ApiError::UnsupportedValue {
                    url: self.url.clone(),
                    field,
                })
            }
        }
    }
}

#[async_trait]
impl MetricsSource for MetricsClient {
    async fn sample(&self) -> Result<Sample, ApiError> {
        MetricsClient::sample(self).await
    }
}

/// Extract a sample from a status body.
///
/// On failure returns the key path of the field that could not be coerced.
pub fn parse_sample(
    body: &Value,
    cpu_key: &KeyPath,
    replicas_key: &KeyPath,
) -> Result<Sample, String> {
    let cpu = coerce_cpu(&cpu_key.lookup(body)).ok_or_else(|| cpu_key.to_string())?;
    let replicas =
        coerce_replicas(&replicas_key.lookup(body)).ok_or_else(|| replicas_key.to_string())?;
    Ok(Sample::new(cpu, replicas))
}

/// Numbers and numeric strings ("33.7") are accepted; negatives and non-finite values are not.
fn coerce_cpu(value: &Value) -> Option<f64> {
    let cpu = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (cpu.is_finite() && cpu >= 0.0).then_some(cpu)
}

/// Integers, integer strings, and floats (truncated toward zero) are accepted.
fn coerce_replicas(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_u64() {
                return u32::try_from(int).ok();
            }
            let float = n.as_f64()?;
            (float.is_finite() && float >= 0.0 && float <= u32::MAX as f64)
                .then(|| float.trunc() as u32)
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
