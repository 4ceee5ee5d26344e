//! Run command implementation

use crate::cli::RunArgs;
use crate::config::{ConfigError, LogFormat, ScaleitConfig};
use crate::control::ControlLoop;
use crate::telemetry;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load the base file, merging the user file over it when given.
///
/// A missing base file falls back to defaults (or the user file alone).
pub fn load_config_files(base: &Path, user: Option<&Path>) -> Result<ScaleitConfig, ConfigError> {
    if base.exists() {
        return ScaleitConfig::load_layered(base, user);
    }
    match user {
        Some(user) => ScaleitConfig::load(Some(user)),
        None => {
            tracing::debug!("Config file not found, using defaults");
            Ok(ScaleitConfig::default())
        }
    }
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &RunArgs,
) -> Result<ScaleitConfig, Box<dyn std::error::Error>> {
    let mut config = load_config_files(&args.config, args.user_config.as_deref())?;

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.dry_run {
        config.engine.dry_run = true;
    }
    if let Some(interval) = args.interval {
        config.engine.autoscale_engine_runs_every = interval;
    }
    if let Some(ref path) = args.cooldown_file {
        config.engine.cooldown_lock_file = path.clone();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main run command handler
pub async fn run_autoscaler(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing and the optional exporter
    init_tracing(&config.logging)?;
    telemetry::init_metrics(&config.telemetry)?;

    tracing::info!(
        status_url = %config.app.status_url(),
        update_url = %config.app.replica_update_url(),
        "Starting scaleit autoscaler"
    );
    tracing::debug!(?config, "Loaded configuration");

    // 3. Wire the control loop
    let control = ControlLoop::from_config(&config)?;

    if args.once {
        let outcome = control.run_cycle().await;
        tracing::info!(outcome = %outcome, "Single cycle finished");
        return Ok(());
    }

    // 4. Run until interrupted
    let cancel_token = CancellationToken::new();
    let handle = control.start(cancel_token.clone());

    shutdown_signal(cancel_token).await;
    handle.await?;

    tracing::info!("Autoscaler stopped");
    Ok(())
}
