use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{Config, IllegalActionMode};

/// Overrides `[api] base_url`.
pub const API_URL_ENV: &str = "VISITS_API_URL";
/// Overrides `[machine] illegal_actions`.
pub const ILLEGAL_ACTIONS_ENV: &str = "VISITS_ILLEGAL_ACTIONS";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/visits/config.toml` on Linux, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("visits").join("config.toml")
    }

    /// Loads configuration from the default config file, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - A missing file yields `Config::default()`.
    /// - Environment overrides are applied before validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api.base_url = url;
        }

        if let Some(mode) = lookup(ILLEGAL_ACTIONS_ENV) {
            let parsed =
                IllegalActionMode::parse(&mode).ok_or_else(|| ConfigError::ValidationError {
                    message: format!(
                        "{} must be 'strict' or 'report', got '{}'",
                        ILLEGAL_ACTIONS_ENV, mode
                    ),
                })?;
            self.machine.illegal_actions = Some(parsed);
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The API base URL is not empty
    /// - No timeout or interval is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "api.base_url must not be empty".to_string(),
            });
        }

        let durations = [
            ("api.timeout_seconds", self.api.timeout_seconds),
            ("timers.deeplink_timeout_ms", self.timers.deeplink_timeout_ms),
            ("timers.trips_refresh_seconds", self.timers.trips_refresh_seconds),
            ("timers.history_ttl_seconds", self.timers.history_ttl_seconds),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationError {
                message: format!("{} must be greater than zero", name),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut config = Config::default();
        config
            .apply_overrides(|name| (name == API_URL_ENV).then(|| "http://localhost:9000".into()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_env_override_rejects_unknown_mode() {
        let mut config = Config::default();
        let result = config.apply_overrides(|name| {
            (name == ILLEGAL_ACTIONS_ENV).then(|| "lenient".into())
        });
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.timers.history_ttl_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timers.history_ttl_seconds"));
    }
}
