//! Configuration module for scaleit
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SCALEIT_*`)
//! 3. User configuration file, merged key by key over the base file
//! 4. Base configuration file (TOML)
//! 5. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use scaleit::config::ScaleitConfig;
//!
//! let config = ScaleitConfig::default();
//! assert_eq!(config.scaling.min_replicas, 1);
//!
//! let toml = r#"
//! [scaling]
//! min_replicas = 2
//! max_replicas = 12
//! "#;
//! let config: ScaleitConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.scaling.max_replicas, 12);
//! ```

pub mod app;
pub mod engine;
pub mod error;
pub mod logging;
pub mod retry;
pub mod scaling;
pub mod telemetry;

pub use app::{build_url, AppConfig};
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use retry::RetryConfig;
pub use scaling::ScalingTargets;
pub use telemetry::TelemetryConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unified, immutable configuration for the autoscaler.
///
/// Built once at startup; each component receives the section it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScaleitConfig {
    /// Utilization targets, replica bounds and cooldown
    pub scaling: ScalingTargets,
    /// Status and replica update endpoints of the scaled application
    pub app: AppConfig,
    /// Retry and backoff behavior for both API calls
    pub retry: RetryConfig,
    /// Control loop settings
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    #[serde(rename = "metrics")]
    pub telemetry: TelemetryConfig,
}

impl ScaleitConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let table = read_table(p)?;
                Self::from_table(table)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load a base file and merge an optional user file over it.
    ///
    /// Tables are merged recursively; any other value in the user file replaces the
    /// base value wholesale.
    pub fn load_layered(base: &Path, user: Option<&Path>) -> Result<Self, ConfigError> {
        let mut table = read_table(base)?;
        if let Some(user) = user {
            merge_tables(&mut table, read_table(user)?);
        }
        Self::from_table(table)
    }

    fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        Self::deserialize(toml::Value::Table(table)).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides
    ///
    /// Supports SCALEIT_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("SCALEIT_APP_HOST") {
            self.app.host = host;
        }
        if let Ok(port) = std::env::var("SCALEIT_APP_PORT") {
            if let Ok(p) = port.parse() {
                self.app.port = p;
            }
        }

        if let Ok(level) = std::env::var("SCALEIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SCALEIT_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(every) = std::env::var("SCALEIT_RUNS_EVERY") {
            if let Ok(secs) = every.parse() {
                self.engine.autoscale_engine_runs_every = secs;
            }
        }
        if let Ok(path) = std::env::var("SCALEIT_COOLDOWN_FILE") {
            self.engine.cooldown_lock_file = PathBuf::from(path);
        }
        if let Ok(dry_run) = std::env::var("SCALEIT_DRY_RUN") {
            self.engine.dry_run = dry_run.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scaling.validate()?;
        self.app.validate()?;
        self.retry.validate()?;

        if self.engine.autoscale_engine_runs_every == 0 {
            return Err(ConfigError::Validation {
                field: "engine.autoscale_engine_runs_every".to_string(),
                message: "interval must be at least one second".to_string(),
            });
        }
        if self.engine.cooldown_lock_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingField(
                "engine.cooldown_lock_file".to_string(),
            ));
        }

        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    content
        .parse::<toml::Table>()
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let incoming = match value {
            toml::Value::Table(incoming) => incoming,
            other => {
                base.insert(key, other);
                continue;
            }
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, toml::Value::Table(incoming));
    }
}
