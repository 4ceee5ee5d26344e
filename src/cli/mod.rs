//! CLI module for scaleit
//!
//! Command-line interface definitions and handlers for the autoscaler.
//!
//! # Commands
//!
//! - `run` - Start the control loop
//! - `status` - Sample once and show the decision the engine would take
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Run with the default config, logging decisions only
//! scaleit run --dry-run
//!
//! # One cycle against a custom config
//! scaleit run -c prod.toml --once
//!
//! # Generate shell completions
//! scaleit completions bash > ~/.bash_completion.d/scaleit
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod run;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// scaleit - Reactive CPU autoscaler
#[derive(Parser, Debug)]
#[command(
    name = "scaleit",
    version,
    about = "Reactive CPU-based replica autoscaler"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the autoscaler control loop
    Run(RunArgs),
    /// Show current utilization, cooldown and the pending decision
    Status(StatusArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scaleit.toml")]
    pub config: PathBuf,

    /// User configuration merged over the base file
    #[arg(long)]
    pub user_config: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SCALEIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log decisions without updating replicas
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Override seconds between cycles
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override the cooldown state file
    #[arg(long)]
    pub cooldown_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "scaleit.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "scaleit.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["scaleit", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("scaleit.toml"));
                assert!(args.user_config.is_none());
                assert!(!args.dry_run);
                assert!(!args.once);
                assert!(args.interval.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "scaleit",
            "run",
            "-c",
            "base.toml",
            "--user-config",
            "user.toml",
            "--dry-run",
            "--once",
            "--interval",
            "10",
            "--cooldown-file",
            "/tmp/cooldown",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("base.toml"));
                assert_eq!(args.user_config, Some(PathBuf::from("user.toml")));
                assert!(args.dry_run);
                assert!(args.once);
                assert_eq!(args.interval, Some(10));
                assert_eq!(args.cooldown_file, Some(PathBuf::from("/tmp/cooldown")));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_status_json() {
        let cli = Cli::try_parse_from(["scaleit", "status", "--json"]).unwrap();
        match cli.command {
            Commands::Status(args) => assert!(args.json),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["scaleit", "config", "init", "-o", "x.toml"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert_eq!(args.output, PathBuf::from("x.toml"));
                assert!(!args.force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_interval() {
        assert!(Cli::try_parse_from(["scaleit", "run", "--interval", "soon"]).is_err());
    }
}
