//! scaleit - Reactive CPU autoscaler
//!
//! Periodically samples a workload's average CPU utilization and replica count,
//! decides whether to scale out, scale in or hold, and pushes the new replica
//! count to the orchestration API. Scale actions are separated by a persisted
//! cooldown window, and scale-in is refused when it would immediately push the
//! average back over the scale-out target.

pub mod cli;
pub mod client;
pub mod config;
pub mod control;
pub mod cooldown;
pub mod engine;
pub mod logging;
pub mod retry;
pub mod telemetry;

/// Round to two decimal places, halves away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
