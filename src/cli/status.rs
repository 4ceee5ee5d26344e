//! Status command implementation

use crate::cli::output::{format_status_json, format_status_table, StatusView};
use crate::cli::StatusArgs;
use crate::client::MetricsClient;
use crate::config::ScaleitConfig;
use crate::cooldown::CooldownTracker;
use crate::engine::{ScalingDecision, ScalingDecisionEngine};
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};

/// Sample once and build the status view. Never touches replicas or the cooldown file.
pub async fn collect_status(
    config: &ScaleitConfig,
) -> Result<StatusView, Box<dyn std::error::Error>> {
    let client = MetricsClient::new(&config.app, RetryPolicy::from(&config.retry))?;
    let engine = ScalingDecisionEngine::new(config.scaling.clone());
    let cooldown = CooldownTracker::file(
        &config.engine.cooldown_lock_file,
        config.scaling.cool_down_time_seconds,
    );

    let (sample, sample_error) = match client.sample().await {
        Ok(sample) => (Some(sample), None),
        Err(error) => (None, Some(error.to_string())),
    };
    let decision = sample
        .map(|s| engine.decide(&s, &cooldown))
        .unwrap_or(ScalingDecision::NoOp);

    Ok(StatusView {
        status_url: client.url().to_string(),
        cpu_utilization: sample.map(|s| s.cpu_utilization),
        replicas: sample.map(|s| s.replica_count),
        sample_error,
        target_scale_out: config.scaling.target_avg_cpu_utilization_for_scale_out,
        target_scale_in: config.scaling.target_avg_cpu_utilization_for_scale_in,
        min_replicas: config.scaling.min_replicas,
        max_replicas: config.scaling.max_replicas,
        cooldown_seconds: config.scaling.cool_down_time_seconds,
        last_action_at: cooldown.last_action().and_then(to_utc),
        cooldown_remaining_seconds: cooldown.remaining_seconds(),
        decision,
        dry_run: config.engine.dry_run,
    })
}

fn to_utc(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    let secs = epoch_seconds.floor();
    let nanos = ((epoch_seconds - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Handle status command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = if args.config.exists() {
        ScaleitConfig::load(Some(&args.config))?
    } else {
        ScaleitConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;

    let view = collect_status(&config).await?;
    if args.json {
        Ok(format_status_json(&view)?)
    } else {
        Ok(format_status_table(&view))
    }
}
