use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::reducer::ReducerConfig;
use crate::mvi::IllegalActionPolicy;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub timers: TimersConfig,
    #[serde(default)]
    pub machine: MachineConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the tracking backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimersConfig {
    /// How long the splash screen waits for a deep link (default: 3000).
    #[serde(default = "default_deeplink_timeout_ms")]
    pub deeplink_timeout_ms: u64,
    /// Trips refresh period while signed in (default: 60).
    #[serde(default = "default_trips_refresh")]
    pub trips_refresh_seconds: u64,
    /// Freshness window for today's history (default: 60).
    #[serde(default = "default_history_ttl")]
    pub history_ttl_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Unset means strict in debug builds and report in release builds.
    #[serde(default)]
    pub illegal_actions: Option<IllegalActionMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IllegalActionMode {
    Strict,
    Report,
}

impl IllegalActionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(IllegalActionMode::Strict),
            "report" => Some(IllegalActionMode::Report),
            _ => None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.visits.dev".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_deeplink_timeout_ms() -> u64 {
    3000
}

fn default_trips_refresh() -> u64 {
    60
}

fn default_history_ttl() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            deeplink_timeout_ms: default_deeplink_timeout_ms(),
            trips_refresh_seconds: default_trips_refresh(),
            history_ttl_seconds: default_history_ttl(),
        }
    }
}

impl Config {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig {
            deeplink_timeout: Duration::from_millis(self.timers.deeplink_timeout_ms),
            trips_refresh_interval: Duration::from_secs(self.timers.trips_refresh_seconds),
            history_ttl: Duration::from_secs(self.timers.history_ttl_seconds),
        }
    }

    pub fn illegal_action_policy(&self) -> IllegalActionPolicy {
        match self.machine.illegal_actions {
            Some(IllegalActionMode::Strict) => IllegalActionPolicy::Strict,
            Some(IllegalActionMode::Report) => IllegalActionPolicy::Report,
            None => IllegalActionPolicy::default(),
        }
    }
}
