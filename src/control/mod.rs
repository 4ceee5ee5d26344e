//! Control loop
//!
//! Each tick runs one cycle: sample the application, decide, and apply the
//! decision unless it is a no-op or dry run is on. A failed sample skips the
//! cycle; nothing except cancellation stops the loop.

use crate::client::{MetricsClient, MetricsSource, ReplicaScaler, ReplicaUpdater};
use crate::config::ScaleitConfig;
use crate::cooldown::CooldownTracker;
use crate::engine::{ScalingDecision, ScalingDecisionEngine};
use crate::retry::RetryPolicy;
use crate::telemetry;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Result of a single control loop cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// No usable sample this cycle
    Skipped { reason: String },
    /// Nothing to change
    Steady,
    /// Decision logged but not sent (dry run)
    Planned { decision: ScalingDecision },
    /// Replica update confirmed by the API
    Applied { decision: ScalingDecision },
    /// Replica update sent but not confirmed
    NotConfirmed { decision: ScalingDecision },
}

impl CycleOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Skipped { .. } => "skipped",
            CycleOutcome::Steady => "steady",
            CycleOutcome::Planned { .. } => "planned",
            CycleOutcome::Applied { .. } => "applied",
            CycleOutcome::NotConfirmed { .. } => "not_confirmed",
        }
    }

    pub fn decision(&self) -> ScalingDecision {
        match self {
            CycleOutcome::Planned { decision }
            | CycleOutcome::Applied { decision }
            | CycleOutcome::NotConfirmed { decision } => *decision,
            CycleOutcome::Skipped { .. } | CycleOutcome::Steady => ScalingDecision::NoOp,
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
            CycleOutcome::Steady => write!(f, "steady"),
            CycleOutcome::Planned { decision } => write!(f, "planned {}", decision),
            CycleOutcome::Applied { decision } => write!(f, "applied {}", decision),
            CycleOutcome::NotConfirmed { decision } => write!(f, "{} not confirmed", decision),
        }
    }
}

/// Periodic sample, decide, apply loop for one workload.
pub struct ControlLoop {
    source: Arc<dyn MetricsSource>,
    scaler: Arc<dyn ReplicaScaler>,
    engine: ScalingDecisionEngine,
    cooldown: CooldownTracker,
    interval: Duration,
    dry_run: bool,
}

impl ControlLoop {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        scaler: Arc<dyn ReplicaScaler>,
        engine: ScalingDecisionEngine,
        cooldown: CooldownTracker,
    ) -> Self {
        Self {
            source,
            scaler,
            engine,
            cooldown,
            interval: DEFAULT_INTERVAL,
            dry_run: false,
        }
    }

    /// Wire HTTP clients, engine and file-backed cooldown from configuration.
    ///
    /// Both clients share one connection pool.
    pub fn from_config(config: &ScaleitConfig) -> Result<Self, reqwest::Error> {
        let retry = RetryPolicy::from(&config.retry);
        let http = reqwest::Client::builder()
            .timeout(config.app.connection_timeout())
            .build()?;

        let source = MetricsClient::with_client(&config.app, retry.clone(), http.clone());
        let scaler = ReplicaUpdater::with_client(&config.app, retry, http);
        let cooldown = CooldownTracker::file(
            &config.engine.cooldown_lock_file,
            config.scaling.cool_down_time_seconds,
        );

        Ok(Self::new(
            Arc::new(source),
            Arc::new(scaler),
            ScalingDecisionEngine::new(config.scaling.clone()),
            cooldown,
        )
        .with_interval(config.engine.interval())
        .with_dry_run(config.engine.dry_run))
    }

    /// Time between cycle starts. Zero is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn engine(&self) -> &ScalingDecisionEngine {
        &self.engine
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Run one cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let outcome = self.evaluate().await;
        metrics::counter!(telemetry::CYCLES_TOTAL, "outcome" => outcome.label()).increment(1);
        tracing::debug!(outcome = %outcome, "Cycle completed");
        outcome
    }

    async fn evaluate(&self) -> CycleOutcome {
        let sample = match self.source.sample().await {
            Ok(sample) => sample,
            Err(error) => {
                tracing::warn!(
                    kind = error.kind(),
                    error = %error,
                    "Autoscaler execution skipped, no usable sample this cycle"
                );
                return CycleOutcome::Skipped {
                    reason: error.to_string(),
                };
            }
        };
        telemetry::record_sample(&sample);

        let decision = self.engine.decide(&sample, &self.cooldown);
        if decision.is_noop() {
            tracing::debug!(
                interval_seconds = self.interval.as_secs_f64(),
                "No scale action, will re-evaluate next cycle"
            );
            return CycleOutcome::Steady;
        }

        if self.dry_run {
            tracing::info!(decision = %decision, "Dry run, replica update not sent");
            return CycleOutcome::Planned { decision };
        }

        if self
            .engine
            .apply(decision, self.scaler.as_ref(), &self.cooldown)
            .await
        {
            CycleOutcome::Applied { decision }
        } else {
            CycleOutcome::NotConfirmed { decision }
        }
    }

    /// Spawn the loop. The first cycle starts immediately.
    ///
    /// Cancelling the token drops the running cycle at its next await point,
    /// including any in-flight request or backoff wait.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.interval.as_secs_f64(),
                dry_run = self.dry_run,
                "Autoscaler started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = cancel_token.cancelled() => break,
                            _ = self.run_cycle() => {}
                        }
                    }
                }
            }

            tracing::info!("Autoscaler shutting down");
        })
    }
}

impl fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlLoop")
            .field("engine", &self.engine)
            .field("cooldown", &self.cooldown)
            .field("interval", &self.interval)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}
