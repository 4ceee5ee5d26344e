//! Scale-in safety check.

use super::Sample;
use crate::config::ScalingTargets;
use crate::round2;

/// Smallest replica count at or above `desired` that can absorb the current load
/// without crossing the scale-out target.
///
/// Total load (`cpu * replicas`) is held constant while candidates are tried one
/// by one. Returns `None` when no candidate below the current replica count (and
/// within `max_replicas`) is safe.
pub fn avoid_flapping(desired: u32, sample: &Sample, targets: &ScalingTargets) -> Option<u32> {
    let target_out = targets.target_avg_cpu_utilization_for_scale_out;
    let total = sample.total_utilization();

    tracing::debug!(
        desired,
        current = sample.replica_count,
        "Checking if scale-in can cause flapping"
    );

    let mut candidate = desired;
    while candidate < sample.replica_count && candidate <= targets.max_replicas {
        let effective = round2(total / f64::from(candidate));
        if effective < target_out {
            tracing::info!(
                effective_cpu_utilization = effective,
                scale_in_target = targets.target_avg_cpu_utilization_for_scale_in,
                scale_out_target = target_out,
                desired = candidate,
                "Verified scale-in target"
            );
            return Some(candidate);
        }
        tracing::debug!(
            effective_cpu_utilization = effective,
            scale_out_target = target_out,
            desired = candidate,
            "Scale-in ignored to avoid flapping"
        );
        candidate += 1;
    }

    tracing::info!(
        current = sample.replica_count,
        "No scale-in to avoid flapping"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(out: f64, min: u32, max: u32) -> ScalingTargets {
        ScalingTargets {
            target_avg_cpu_utilization_for_scale_out: out,
            target_avg_cpu_utilization_for_scale_in: out / 2.0,
            min_replicas: min,
            max_replicas: max,
            cool_down_time_seconds: 0,
        }
    }

    #[test]
    fn test_first_candidate_accepted() {
        let sample = Sample::new(0.20, 10);
        assert_eq!(avoid_flapping(4, &sample, &targets(0.60, 1, 10)), Some(4));
    }

    #[test]
    fn test_rounding_up_to_target_is_rejected() {
        // 1.2 / 2 == 0.60, exactly on the scale-out target
        let sample = Sample::new(0.30, 4);
        assert_eq!(avoid_flapping(2, &sample, &targets(0.60, 1, 10)), Some(3));
    }

    #[test]
    fn test_total_load_held_constant_across_increments() {
        // total 3.0: 3/4 = 0.75, 3/5 = 0.60 rejected, 3/6 = 0.50 accepted
        let sample = Sample::new(0.30, 10);
        assert_eq!(avoid_flapping(4, &sample, &targets(0.60, 1, 10)), Some(6));
    }

    #[test]
    fn test_no_safe_candidate() {
        let sample = Sample::new(0.90, 5);
        assert_eq!(avoid_flapping(2, &sample, &targets(0.60, 1, 10)), None);
    }

    #[test]
    fn test_candidates_capped_by_max_replicas() {
        // 3/4 and 3/5 are too hot, 3/6 would be safe but exceeds max
        let sample = Sample::new(0.30, 10);
        assert_eq!(avoid_flapping(4, &sample, &targets(0.60, 1, 5)), None);
    }

    #[test]
    fn test_zero_candidate_is_rejected() {
        let sample = Sample::new(0.10, 3);
        assert_eq!(avoid_flapping(0, &sample, &targets(0.60, 0, 10)), Some(1));
    }

    #[test]
    fn test_idle_workload_with_zero_min() {
        let sample = Sample::new(0.0, 3);
        // 0/0 is NaN, which never compares below the target
        assert_eq!(avoid_flapping(0, &sample, &targets(0.60, 0, 10)), Some(1));
    }
}
