//! Retry policy and the backoff driver shared by the API clients.
//!
//! A call is made up to `max_attempts` times. Between attempts the driver sleeps
//! for [`RetryPolicy::next_delay`]; no wait follows the final attempt.
//!
//! ```rust
//! use scaleit::retry::RetryPolicy;
//! use std::collections::BTreeSet;
//!
//! let policy = RetryPolicy {
//!     max_attempts: 4,
//!     base_delay_seconds: 2.0,
//!     exponential: true,
//!     jitter: false,
//!     retryable_status_classes: BTreeSet::from([5]),
//!     retry_on_connection_error: true,
//! };
//! let delays: Vec<f64> = (1..=4).map(|n| policy.delay_seconds(n, 1.0)).collect();
//! assert_eq!(delays, vec![2.0, 4.0, 8.0, 16.0]);
//! ```

use crate::client::ApiError;
use crate::config::RetryConfig;
use crate::telemetry;
use rand::Rng;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

/// How failed calls are retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retries
    pub max_attempts: u32,
    pub base_delay_seconds: f64,
    /// Wait `base^attempt` instead of `base`
    pub exponential: bool,
    /// Multiply each wait by a fresh random factor in [1, 2)
    pub jitter: bool,
    /// Hundreds digits of retryable HTTP statuses
    pub retryable_status_classes: BTreeSet<u16>,
    pub retry_on_connection_error: bool,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.api_retries_count,
            base_delay_seconds: config.retry_after_seconds,
            exponential: config.retry_exponentially,
            jitter: config.retry_add_randomness,
            retryable_status_classes: config.retry_on_http_codes.clone(),
            retry_on_connection_error: config.retry_on_connection_error,
        }
    }
}

impl RetryPolicy {
    /// Wait in seconds after the given attempt, rounded to hundredths.
    ///
    /// Exponential growth starts at the first attempt: `base^1`, `base^2`, ...
    pub fn delay_seconds(&self, attempt: u32, jitter_multiplier: f64) -> f64 {
        let base = if self.exponential {
            self.base_delay_seconds
                .powi(i32::try_from(attempt).unwrap_or(i32::MAX))
        } else {
            self.base_delay_seconds
        };
        crate::round2(base * jitter_multiplier)
    }

    /// 1 without jitter, otherwise uniform in [1, 2). Drawn per call, so jittered
    /// delays are not guaranteed to grow monotonically.
    pub fn jitter_multiplier(&self) -> f64 {
        if !self.jitter {
            return 1.0;
        }
        1.0 + rand::thread_rng().gen::<f64>()
    }

    /// Wait to apply after a failed `attempt`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let seconds = self.delay_seconds(attempt, self.jitter_multiplier());
        Duration::try_from_secs_f64(seconds).unwrap_or(if seconds > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }

    /// Whether the error class is configured for retry.
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Connection { .. } | ApiError::Timeout { .. } => self.retry_on_connection_error,
            ApiError::HttpStatus { .. } => error
                .status_class()
                .is_some_and(|class| self.retryable_status_classes.contains(&class)),
            _ => false,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(
        &self,
        endpoint: &'static str,
        url: &str,
        mut op: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.is_retryable(&error) {
                tracing::debug!(url, attempt, error = %error, "Error is not retryable");
                return Err(error);
            }
            if self.max_attempts <= 1 {
                tracing::warn!(url, error = %error, "No retry configured");
                return Err(error);
            }
            if attempt >= self.max_attempts {
                return Err(ApiError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.next_delay(attempt);
            tracing::warn!(
                url,
                attempt,
                max_attempts = self.max_attempts,
                wait_seconds = delay.as_secs_f64(),
                error = %error,
                "Call failed, retrying after backoff"
            );
            metrics::counter!(telemetry::API_RETRIES_TOTAL, "endpoint" => endpoint).increment(1);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
