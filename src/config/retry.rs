//! Retry configuration shared by both API clients

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Retry and backoff settings for calls to the scaled application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one
    pub api_retries_count: u32,
    /// Base delay in seconds (the base of the power when retrying exponentially)
    pub retry_after_seconds: f64,
    pub retry_exponentially: bool,
    /// Multiply each delay by a random factor in [1, 2)
    pub retry_add_randomness: bool,
    /// Retryable HTTP status classes by hundreds digit, e.g. `[5]` for 5xx
    pub retry_on_http_codes: BTreeSet<u16>,
    pub retry_on_connection_error: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            api_retries_count: 3,
            retry_after_seconds: 2.0,
            retry_exponentially: true,
            retry_add_randomness: true,
            retry_on_http_codes: BTreeSet::from([5]),
            retry_on_connection_error: true,
        }
    }
}

impl RetryConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.api_retries_count == 0 {
            return Err(ConfigError::Validation {
                field: "retry.api_retries_count".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        let base = self.retry_after_seconds;
        if !base.is_finite() || base < 0.0 {
            return Err(ConfigError::Validation {
                field: "retry.retry_after_seconds".to_string(),
                message: "delay must be a non-negative number of seconds".to_string(),
            });
        }
        if let Some(class) = self
            .retry_on_http_codes
            .iter()
            .find(|class| !(1..=5).contains(*class))
        {
            return Err(ConfigError::Validation {
                field: "retry.retry_on_http_codes".to_string(),
                message: format!("{} is not an HTTP status class (1-5)", class),
            });
        }

        Ok(())
    }
}
