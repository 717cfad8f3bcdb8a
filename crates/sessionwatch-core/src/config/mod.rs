//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `SESSIONWATCH__*` environment variables. Each
//! sub-module represents a logical configuration section, and every field
//! carries a default so an empty configuration is valid.

pub mod bridge;
pub mod directory;
pub mod logging;
pub mod poller;

use serde::{Deserialize, Serialize};

use self::bridge::BridgeConfig;
use self::directory::DirectoryConfig;
use self::logging::LoggingConfig;
use self::poller::PollerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session status polling settings.
    #[serde(default)]
    pub poller: PollerConfig,
    /// Revocation bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// User directory (document store) settings for the role report.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, and environment
    /// variables prefixed with `SESSIONWATCH__`. Missing files are skipped.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Load configuration from an explicit list of files (later files win).
    pub fn load_from(paths: &[String]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SESSIONWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Reject values that would make the poller misbehave.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.poller.interval_seconds == 0 {
            return Err(AppError::configuration(
                "poller.interval_seconds must be greater than zero",
            ));
        }
        if self.poller.status_url.trim().is_empty() {
            return Err(AppError::configuration("poller.status_url must not be empty"));
        }
        if self.bridge.channel_capacity == 0 {
            return Err(AppError::configuration(
                "bridge.channel_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.poller.interval_seconds, 30);
        assert_eq!(config.bridge.channel_capacity, 64);
        assert_eq!(config.directory.collection, "users");
        assert_eq!(
            config.directory.roles,
            vec!["admin", "support", "advisor", "user"]
        );
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AppConfig::default();
        config.poller.interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_files_succeeds() {
        let config = AppConfig::load_from(&["does/not/exist".to_string()]).unwrap();
        assert_eq!(config.poller.interval_seconds, 30);
    }
}
