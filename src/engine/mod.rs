//! Scaling decision engine
//!
//! Sizes the workload so average CPU utilization lands at the scale-out target,
//! clamps the result into the replica bounds, and guards scale-in against
//! flapping. The cooldown window overrides every direction.

pub mod decision;
pub mod flapping;

pub use decision::{Sample, ScalingDecision};
pub use flapping::avoid_flapping;

use crate::client::ReplicaScaler;
use crate::config::ScalingTargets;
use crate::cooldown::CooldownTracker;
use crate::telemetry;

/// Turns samples into scaling decisions for one workload.
#[derive(Debug, Clone)]
pub struct ScalingDecisionEngine {
    targets: ScalingTargets,
}

impl ScalingDecisionEngine {
    pub fn new(targets: ScalingTargets) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &ScalingTargets {
        &self.targets
    }

    /// Replica count that brings the sample to the scale-out target, before clamping.
    pub fn desired_replicas(&self, sample: &Sample) -> u32 {
        let ratio = sample.cpu_utilization / self.targets.target_avg_cpu_utilization_for_scale_out;
        // float-to-int casts saturate
        (f64::from(sample.replica_count) * ratio).ceil() as u32
    }

    pub fn clamp(&self, desired: u32) -> u32 {
        desired
            .max(self.targets.min_replicas)
            .min(self.targets.max_replicas)
    }

    /// Decide what to do with `sample`. Reads the cooldown store but never writes it.
    pub fn decide(&self, sample: &Sample, cooldown: &CooldownTracker) -> ScalingDecision {
        let current = sample.replica_count;
        let desired = self.desired_replicas(sample);
        tracing::info!(
            desired,
            current,
            min = self.targets.min_replicas,
            max = self.targets.max_replicas,
            "Computed desired replicas"
        );

        if let Some(remaining) = cooldown.remaining_seconds() {
            tracing::info!(
                remaining_seconds = remaining,
                cooldown_seconds = cooldown.cooldown_seconds(),
                "Need to cool down, ignoring any scale-out/in"
            );
            return ScalingDecision::NoOp;
        }

        let desired = self.clamp(desired);
        if desired > current {
            tracing::info!(
                delta = desired - current,
                current,
                desired,
                "Scale-out is required"
            );
            return ScalingDecision::ScaleOut(desired);
        }
        if desired < current {
            return match avoid_flapping(desired, sample, &self.targets) {
                Some(target) => {
                    tracing::info!(
                        delta = current - target,
                        current,
                        desired = target,
                        "Scale-in is required"
                    );
                    ScalingDecision::ScaleIn(target)
                }
                None => ScalingDecision::NoOp,
            };
        }

        tracing::debug!(current, "No scale-out/scale-in needed");
        ScalingDecision::NoOp
    }

    /// Execute `decision` through `scaler`, recording the action on success.
    ///
    /// Returns true when a replica update was confirmed.
    pub async fn apply(
        &self,
        decision: ScalingDecision,
        scaler: &dyn ReplicaScaler,
        cooldown: &CooldownTracker,
    ) -> bool {
        let Some(target) = decision.target() else {
            return false;
        };

        metrics::gauge!(telemetry::REPLICAS_DESIRED).set(f64::from(target));
        tracing::info!(decision = %decision, "Applying scaling decision");

        let confirmed = scaler.update(target).await;
        metrics::counter!(telemetry::SCALE_ACTIONS_TOTAL,
            "direction" => decision.direction(),
            "result" => if confirmed { "confirmed" } else { "failed" }
        )
        .increment(1);

        if confirmed {
            cooldown.record_action();
        }
        confirmed
    }
}
