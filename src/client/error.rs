//! Error types for calls to the scaled application.

use std::time::Duration;
use thiserror::Error;

/// Failure of a status read or replica update call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection refused, reset, DNS failure and similar transport errors
    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: f64 },

    /// 4xx or 5xx response; retryable when its class is configured
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The body parsed as JSON but the selected field has an unusable value
    #[error("{url} returned a non-supported value for '{field}'")]
    UnsupportedValue { url: String, field: String },

    #[error("{url} returned an unreadable body: {message}")]
    MalformedResponse { url: String, message: String },

    /// The request could not be built (bad URL, bad header)
    #[error("invalid request to {url}: {message}")]
    InvalidRequest { url: String, message: String },

    #[error("all {attempts} attempts to {url} failed, last error: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<ApiError>,
    },
}

impl ApiError {
    /// Classify a reqwest transport error.
    pub fn from_reqwest(url: &str, error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                seconds: timeout.as_secs_f64(),
            }
        } else if error.is_builder() {
            ApiError::InvalidRequest {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            ApiError::Connection {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Hundreds digit of an HTTP error status (5 for 503).
    pub fn status_class(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(status / 100),
            _ => None,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Connection { .. } => "connection",
            ApiError::Timeout { .. } => "timeout",
            ApiError::HttpStatus { .. } => "http_status",
            ApiError::UnsupportedValue { .. } => "unsupported_value",
            ApiError::MalformedResponse { .. } => "malformed_response",
            ApiError::InvalidRequest { .. } => "invalid_request",
            ApiError::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class() {
        let err = ApiError::HttpStatus {
            url: "http://app".to_string(),
            status: 503,
        };
        assert_eq!(err.status_class(), Some(5));
        assert_eq!(err.kind(), "http_status");
        assert_eq!(err.to_string(), "http://app returned HTTP 503");
    }

    #[test]
    fn test_non_http_errors_have_no_class() {
        let err = ApiError::Timeout {
            url: "http://app".to_string(),
            seconds: 2.5,
        };
        assert_eq!(err.status_class(), None);
        assert_eq!(err.to_string(), "request to http://app timed out after 2.5s");
    }

    #[test]
    fn test_exhausted_display_includes_last_error() {
        let err = ApiError::RetriesExhausted {
            url: "http://app".to_string(),
            attempts: 3,
            last: Box::new(ApiError::HttpStatus {
                url: "http://app".to_string(),
                status: 502,
            }),
        };
        assert!(err.to_string().contains("all 3 attempts"));
        assert!(err.to_string().contains("HTTP 502"));
    }
}
