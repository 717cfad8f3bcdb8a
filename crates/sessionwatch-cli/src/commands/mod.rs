//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod roles;
pub mod simulate;
pub mod watch;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use sessionwatch_core::config::AppConfig;
use sessionwatch_core::error::AppError;

/// SessionWatch — session revocation detection toolkit
#[derive(Debug, Parser)]
#[command(name = "sessionwatch-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a single session status check
    Check(check::CheckArgs),
    /// Poll the session status until revoked or interrupted
    Watch(watch::WatchArgs),
    /// Emit a simulated revocation through the bridge
    Simulate(simulate::SimulateArgs),
    /// Report users per role from the user directory
    Roles(roles::RolesArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Check(args) => check::execute(args, &self.config, self.format).await,
            Commands::Watch(args) => watch::execute(args, &self.config).await,
            Commands::Simulate(args) => simulate::execute(args, &self.config, self.format).await,
            Commands::Roles(args) => roles::execute(args, &self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub async fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(&[config_path.to_string()])
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e)))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_named_after_binary() {
        let command = Cli::command();
        command.clone().debug_assert();
        assert_eq!(command.get_name(), "sessionwatch-cli");
    }

    #[test]
    fn test_check_args_parse() {
        let cli = Cli::try_parse_from(["sessionwatch-cli", "check", "--uid", "user-1"]).unwrap();
        assert_eq!(cli.config, "config/default");
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.uid, "user-1");
                assert!(args.url.is_none());
            }
            _ => panic!("expected check command"),
        }
    }
}
