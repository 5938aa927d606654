//! Configuration management for webopener
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use webopener::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Liveness poll every {}", config.timing.liveness_poll);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `WEBOPENER__<section>__<key>`
//!
//! Examples:
//! - `WEBOPENER__TIMING__SETTLE_DELAY=2s`
//! - `WEBOPENER__DISPLAY__CLOSE_WARNING_SECS=15`
//! - `WEBOPENER__TELEMETRY__LOG_FILTER=webopener=debug`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/webopener.toml`.
//! This can be overridden using the `WEBOPENER_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, DisplayConfig, TelemetryConfig, TimingConfig, WindowConfig};
pub use validation::ConfigValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a timer
    /// setting fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[timing]
tick_interval = "1s"
settle_delay = "1s"
liveness_poll = "2s"
close_grace = "200ms"

[display]
open_warning_secs = 3
close_warning_secs = 10
notice_ttl = "4s"

[window]
name = "kiosk"
features = "width=800,height=600"
browser_command = ["chromium", "--app"]

[telemetry]
log_filter = "webopener=debug"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.window.name, "kiosk");
        assert_eq!(config.display.notice_ttl.as_duration(), Duration::from_secs(4));
        assert_eq!(config.timing.backstop_after(10), Duration::from_secs(10));
        assert_eq!(config.telemetry.log_filter, "webopener=debug");
    }

    #[test]
    fn test_validation_catches_zero_poll() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[timing]\nliveness_poll = 0\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ConfigValidationError::ZeroInterval { .. })
        ));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("liveness_poll = \"2s\""));
        assert!(rendered.contains("close_grace = \"200ms\""));
    }
}
