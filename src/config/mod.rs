//! Application configuration: TOML file, defaults and environment overrides.

pub mod loader;
pub mod types;

pub use loader::ConfigError;
pub use types::{ApiConfig, Config, IllegalActionMode, MachineConfig, TimersConfig};
