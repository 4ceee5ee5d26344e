//! Control loop configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Control loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between two control loop cycles
    pub autoscale_engine_runs_every: u64,
    /// File holding the timestamp of the last executed scale action
    pub cooldown_lock_file: PathBuf,
    /// Log decisions without calling the replica update endpoint
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoscale_engine_runs_every: 30,
            cooldown_lock_file: PathBuf::from("scaleit.cooldown"),
            dry_run: false,
        }
    }
}

impl EngineConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.autoscale_engine_runs_every)
    }
}
