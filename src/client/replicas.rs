//! Replica update client.

use super::{ApiError, KeyPath, ReplicaScaler};
use crate::config::AppConfig;
use crate::retry::RetryPolicy;
use crate::telemetry;
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Sends the desired replica count to the orchestration API with `PUT`.
pub struct ReplicaUpdater {
    client: reqwest::Client,
    url: String,
    replicas_key: KeyPath,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ReplicaUpdater {
    pub fn new(app: &AppConfig, retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(app.connection_timeout())
            .build()?;
        Ok(Self::with_client(app, retry, client))
    }

    pub fn with_client(app: &AppConfig, retry: RetryPolicy, client: reqwest::Client) -> Self {
        Self {
            client,
            url: app.replica_update_url(),
            replicas_key: app.read_replicas_key.clone(),
            timeout: app.connection_timeout(),
            retry,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request body for `desired` replicas, shaped by the replica key path.
    pub fn request_body(&self, desired: u32) -> Value {
        self.replicas_key.nest(Value::from(desired))
    }

    /// Push `desired` replicas. True only on a non-error response.
    pub async fn update(&self, desired: u32) -> bool {
        let body = self.request_body(desired);
        let result = self
            .retry
            .execute(telemetry::REPLICAS_ENDPOINT, &self.url, |attempt| {
                self.put_once(&body, attempt)
            })
            .await;

        match result {
            Ok(status) => {
                tracing::info!(
                    url = %self.url,
                    status,
                    replicas = desired,
                    "Scaled to replicas"
                );
                true
            }
            Err(error) => {
                tracing::error!(
                    url = %self.url,
                    replicas = desired,
                    kind = error.kind(),
                    error = %error,
                    "Replica update was not confirmed"
                );
                false
            }
        }
    }

    async fn put_once(&self, body: &Value, attempt: u32) -> Result<u16, ApiError> {
        tracing::debug!(url = %self.url, attempt, body = %body, "Sending replica update");

        let start = Instant::now();
        let response = self
            .client
            .put(&self.url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&self.url, e, self.timeout))?;

        metrics::histogram!(telemetry::API_REQUEST_DURATION_SECONDS,
            "endpoint" => telemetry::REPLICAS_ENDPOINT
        )
        .record(start.elapsed().as_secs_f64());

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ApiError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }
}

#[async_trait]
impl ReplicaScaler for ReplicaUpdater {
    async fn update(&self, desired: u32) -> bool {
        ReplicaUpdater::update(self, desired).await
    }
}
