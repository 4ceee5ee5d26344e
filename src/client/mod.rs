//! HTTP clients for the scaled application.
//!
//! [`MetricsClient`] reads the current CPU utilization and replica count,
//! [`ReplicaUpdater`] pushes a new replica count. Both share one
//! [`RetryPolicy`](crate::retry::RetryPolicy) for backoff and status classification.
//!
//! The control loop only sees the [`MetricsSource`] and [`ReplicaScaler`] traits,
//! so tests can drive it without a server.

pub mod error;
pub mod key_path;
pub mod replicas;
pub mod stats;

pub use error::ApiError;
pub use key_path::{KeyPath, KeyPathError};
pub use replicas::ReplicaUpdater;
pub use stats::MetricsClient;

use crate::engine::Sample;
use async_trait::async_trait;

/// Source of per-cycle samples.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn sample(&self) -> Result<Sample, ApiError>;
}

/// Sink for replica count changes.
#[async_trait]
pub trait ReplicaScaler: Send + Sync {
    /// Request `desired` replicas. Returns true only when the API confirmed the change.
    async fn update(&self, desired: u32) -> bool;
}
