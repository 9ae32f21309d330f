//! Client configuration schemas.
//!
//! Configuration is read from an optional TOML file plus environment
//! variables via the `config` crate. Each sub-module represents a logical
//! configuration section.

pub mod logging;
pub mod rest;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::rest::RestConfig;

use crate::error::AppError;

/// Root client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST endpoint settings.
    #[serde(default)]
    pub rest: RestConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}`, and environment variables prefixed with `LOOPBACK_`
    /// (nested keys separated by `__`, e.g. `LOOPBACK_REST__BASE_URL`).
    /// Every source is optional; missing keys fall back to defaults.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment())
            .build();
        deserialize(config)
    }

    /// Load configuration from an explicit file plus the environment.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(environment())
            .build();
        deserialize(config)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("LOOPBACK")
        .separator("__")
        .try_parsing(true)
}

fn deserialize(config: Result<config::Config, config::ConfigError>) -> Result<ClientConfig, AppError> {
    config
        .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?
        .try_deserialize()
        .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
}
