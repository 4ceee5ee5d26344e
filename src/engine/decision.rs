//! Inputs and outputs of a single scaling decision.

use serde::Serialize;
use std::fmt;

/// One reading from the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Average CPU utilization across replicas, `>= 0`
    pub cpu_utilization: f64,
    pub replica_count: u32,
}

impl Sample {
    pub fn new(cpu_utilization: f64, replica_count: u32) -> Self {
        Self {
            cpu_utilization,
            replica_count,
        }
    }

    /// Load of the whole workload, held constant when sizing hypothetical replica counts.
    pub fn total_utilization(&self) -> f64 {
        self.cpu_utilization * self.replica_count as f64
    }
}

/// What the engine wants done with the workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "replicas", rename_all = "snake_case")]
pub enum ScalingDecision {
    ScaleOut(u32),
    ScaleIn(u32),
    NoOp,
}

impl ScalingDecision {
    /// Replica count to apply, if any.
    pub fn target(&self) -> Option<u32> {
        match self {
            ScalingDecision::ScaleOut(n) | ScalingDecision::ScaleIn(n) => Some(*n),
            ScalingDecision::NoOp => None,
        }
    }

    pub fn direction(&self) -> &'static str {
        match self {
            ScalingDecision::ScaleOut(_) => "scale_out",
            ScalingDecision::ScaleIn(_) => "scale_in",
            ScalingDecision::NoOp => "none",
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, ScalingDecision::NoOp)
    }
}

impl fmt::Display for ScalingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingDecision::ScaleOut(n) => write!(f, "scale-out to {}", n),
            ScalingDecision::ScaleIn(n) => write!(f, "scale-in to {}", n),
            ScalingDecision::NoOp => write!(f, "no change"),
        }
    }
}
