//! Scaled application endpoint configuration

use super::ConfigError;
use crate::client::KeyPath;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the workload's status is read from and where replica updates are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "app_status_host")]
    pub host: String,
    #[serde(alias = "app_status_port")]
    pub port: u16,
    /// Use https when the host carries no scheme
    #[serde(alias = "app_status_secure")]
    pub secure: bool,
    #[serde(alias = "app_status_read_url")]
    pub read_url: String,
    #[serde(alias = "app_replica_update_url")]
    pub replica_update_url: String,
    /// Dot-separated path to the average CPU value in the status body
    pub read_metrics_key: KeyPath,
    /// Dot-separated path to the replica count, also used to shape the update body
    pub read_replicas_key: KeyPath,
    #[serde(alias = "app_connection_timeout")]
    pub connection_timeout_seconds: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8123,
            secure: false,
            read_url: "/app/status".to_string(),
            replica_update_url: "/app/replicas".to_string(),
            read_metrics_key: KeyPath::from_static("cpu.highPriority"),
            read_replicas_key: KeyPath::from_static("replicas"),
            connection_timeout_seconds: 5.0,
        }
    }
}

impl AppConfig {
    /// Full URL of the status (metrics) endpoint.
    pub fn status_url(&self) -> String {
        build_url(&self.host, self.port, &self.read_url, self.secure)
    }

    /// Full URL of the replica update endpoint.
    pub fn replica_update_url(&self) -> String {
        build_url(&self.host, self.port, &self.replica_update_url, self.secure)
    }

    /// Request timeout. Values that cannot form a duration fall back to the default.
    pub fn connection_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connection_timeout_seconds)
            .unwrap_or(Duration::from_secs(5))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "app.host".to_string(),
                message: "host cannot be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Validation {
                field: "app.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        for (field, path) in [
            ("app.read_url", &self.read_url),
            ("app.replica_update_url", &self.replica_update_url),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: format!("'{}' must start with '/'", path),
                });
            }
        }
        let timeout = self.connection_timeout_seconds;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::Validation {
                field: "app.connection_timeout_seconds".to_string(),
                message: "timeout must be a positive number of seconds".to_string(),
            });
        }

        Ok(())
    }
}

/// Join host, port and path into a URL.
///
/// The scheme comes from `secure` unless the host already names one.
pub fn build_url(host: &str, port: u16, path: &str, secure: bool) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        return format!("{}:{}{}", host, port, path);
    }
    let scheme = if secure { "https" } else { "http" };
    format!("{}://{}:{}{}", scheme, host, port, path)
}
