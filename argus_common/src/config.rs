//! Configuration loading traits and types.
//!
//! Every binary in the workspace reads a single TOML file. The shared pieces
//! live here: the log level, the service identity and the link settings that
//! name the producer's segment and mutex.
//!
//! # Usage
//!
//! ```rust,no_run
//! use argus_common::config::{ConfigError, ConfigLoader, LinkConfig, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct MonitorConfig {
//!     shared: SharedConfig,
//!     #[serde(default)]
//!     link: LinkConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = MonitorConfig::load(Path::new("argus_monitor.toml"))?;
//!     config.link.validate()?;
//!     println!("Segment: {}", config.link.mapping_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAPPING_NAME, DEFAULT_MUTEX_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across the workspace binaries.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "argus-monitor-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the connection to the producer's segment.
///
/// # TOML Example
///
/// ```toml
/// [link]
/// mapping_name = "/ARGUSMONITOR_DATA_INTERFACE"
/// mutex_name = "/ARGUSMONITOR_DATA_INTERFACE_MUTEX"
/// lock_timeout_ms = 500
///
/// [link.hardware]
/// GPU = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Name of the producer's shared memory segment.
    pub mapping_name: String,

    /// Name of the cross-process mutex paired with the segment.
    pub mutex_name: String,

    /// Upper bound on the wait for the mutex during one poll.
    pub lock_timeout_ms: u64,

    /// Hardware category overrides applied on top of the all-enabled default.
    pub hardware: BTreeMap<String, bool>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mapping_name: DEFAULT_MAPPING_NAME.to_string(),
            mutex_name: DEFAULT_MUTEX_NAME.to_string(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            hardware: BTreeMap::new(),
        }
    }
}

impl LinkConfig {
    /// Lock timeout as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - either object name is empty
    /// - both names refer to the same object
    /// - `lock_timeout_ms` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mapping_name.is_empty() || self.mutex_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "mapping_name and mutex_name cannot be empty".to_string(),
            ));
        }
        if self.mapping_name == self.mutex_name {
            return Err(ConfigError::ValidationError(format!(
                "mapping and mutex share the name '{}'",
                self.mapping_name
            )));
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for any type implementing
/// `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
