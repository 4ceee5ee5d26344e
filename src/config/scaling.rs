//! Scaling targets configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Utilization targets and replica bounds used to size the workload.
///
/// Loaded once at startup and handed to the decision engine by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingTargets {
    /// Average CPU utilization per replica the workload is sized for
    pub target_avg_cpu_utilization_for_scale_out: f64,
    /// Lower band of the utilization window (informational, must not exceed scale-out)
    pub target_avg_cpu_utilization_for_scale_in: f64,
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Minimum seconds between two executed scale actions
    pub cool_down_time_seconds: u64,
}

impl Default for ScalingTargets {
    fn default() -> Self {
        Self {
            target_avg_cpu_utilization_for_scale_out: 0.80,
            target_avg_cpu_utilization_for_scale_in: 0.60,
            min_replicas: 1,
            max_replicas: 10,
            cool_down_time_seconds: 300,
        }
    }
}

impl ScalingTargets {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let out = self.target_avg_cpu_utilization_for_scale_out;
        let scale_in = self.target_avg_cpu_utilization_for_scale_in;

        if !out.is_finite() || out <= 0.0 {
            return Err(ConfigError::Validation {
                field: "scaling.target_avg_cpu_utilization_for_scale_out".to_string(),
                message: "must be a positive number".to_string(),
            });
        }
        if !scale_in.is_finite() || scale_in < 0.0 {
            return Err(ConfigError::Validation {
                field: "scaling.target_avg_cpu_utilization_for_scale_in".to_string(),
                message: "must be a non-negative number".to_string(),
            });
        }
        if scale_in > out {
            return Err(ConfigError::Validation {
                field: "scaling.target_avg_cpu_utilization_for_scale_in".to_string(),
                message: format!("{} exceeds the scale-out target {}", scale_in, out),
            });
        }
        if self.min_replicas > self.max_replicas {
            return Err(ConfigError::Validation {
                field: "scaling.min_replicas".to_string(),
                message: format!(
                    "min_replicas {} exceeds max_replicas {}",
                    self.min_replicas, self.max_replicas
                ),
            });
        }

        Ok(())
    }
}
