//! Configuration for the telemetry store.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `telemetry_store.toml` file in the working directory
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `TELEMETRY_STORAGE_PATH` - Path of the storage.json document
//! - `TELEMETRY_STORAGE_INDENT` - Spaces per indentation level on write
//! - `TELEMETRY_LOGGING_ENABLED` - Enable logging to stderr
//! - `TELEMETRY_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use config::Config;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;

use crate::errors::{TelemetryError, TelemetryResult};
use crate::store::DEFAULT_INDENT;

/// Global configuration singleton.
static CONFIG: OnceLock<StoreConfig> = OnceLock::new();

/// Default location of the storage document.
pub const DEFAULT_STORAGE_PATH: &str = "./storage.json";

/// Name of the optional config file (without extension).
const CONFIG_FILE: &str = "telemetry_store";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Where the document lives and how it is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON document
    pub path: String,
    /// Spaces per indentation level when writing
    pub indent: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORAGE_PATH.to_string(),
            indent: DEFAULT_INDENT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

fn config_error(e: config::ConfigError) -> TelemetryError {
    TelemetryError::Config(e.to_string())
}

impl StoreConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `telemetry_store.toml` file (optional)
    /// 3. Environment variables
    pub fn load() -> TelemetryResult<Self> {
        let settings = Config::builder()
            .set_default("storage.path", DEFAULT_STORAGE_PATH)
            .map_err(config_error)?
            .set_default("storage.indent", DEFAULT_INDENT as i64)
            .map_err(config_error)?
            .set_default("logging.enabled", false)
            .map_err(config_error)?
            .set_default("logging.level", "info")
            .map_err(config_error)?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .set_override_option("storage.path", env::var("TELEMETRY_STORAGE_PATH").ok())
            .map_err(config_error)?
            .set_override_option(
                "storage.indent",
                env::var("TELEMETRY_STORAGE_INDENT")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_error)?
            .set_override_option(
                "logging.enabled",
                env::var("TELEMETRY_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_error)?
            .set_override_option("logging.level", env::var("TELEMETRY_LOG_LEVEL").ok())
            .map_err(config_error)?
            .build()
            .map_err(|e| TelemetryError::Config(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| TelemetryError::Config(format!("failed to deserialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.storage.path.trim().is_empty() {
            return Err(TelemetryError::Config(
                "storage.path cannot be empty".to_string(),
            ));
        }

        if !(1..=16).contains(&self.storage.indent) {
            return Err(TelemetryError::Config(format!(
                "storage.indent must be between 1 and 16, got {}",
                self.storage.indent
            )));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(TelemetryError::Config(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}

/// Get the global configuration.
///
/// Loads and validates on first access, then caches the result.
pub fn get_config() -> TelemetryResult<&'static StoreConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let config = StoreConfig::load()?;
    config.validate()?;

    // Another thread may have won the race; either value is fine.
    Ok(CONFIG.get_or_init(|| config))
}
