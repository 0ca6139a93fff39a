//! Monitor configuration
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "argus-monitor"
//!
//! [link]
//! lock_timeout_ms = 500
//!
//! [link.hardware]
//! Network = false
//!
//! [monitor]
//! interval_ms = 1000
//! stale_intervals = 10
//! ```

use crate::cli::Args;
use argus::config::{ConfigError, ConfigLoader, LinkConfig, LogLevel, SharedConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default number of intervals without a new cycle before reconnecting.
pub const DEFAULT_STALE_INTERVALS: u32 = 10;

/// Polling loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Time between polls.
    pub interval_ms: u64,
    /// Stop after this many delivered cycles; run until Ctrl-C when unset.
    pub cycles: Option<u64>,
    /// Reconnect after this many intervals without a new cycle.
    pub stale_intervals: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            cycles: None,
            stale_intervals: DEFAULT_STALE_INTERVALS,
        }
    }
}

impl PollSettings {
    /// Interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// How long the cycle counter may stand still before the producer is
    /// considered gone.
    pub fn stale_after(&self) -> Duration {
        self.interval().saturating_mul(self.stale_intervals)
    }
}

/// Whole configuration file of the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Log level and service identity.
    pub shared: SharedConfig,
    /// Segment names, lock timeout and category overrides.
    #[serde(default)]
    pub link: LinkConfig,
    /// Polling loop settings.
    #[serde(default)]
    pub monitor: PollSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: LogLevel::default(),
                service_name: "argus-monitor".to_string(),
            },
            link: LinkConfig::default(),
            monitor: PollSettings::default(),
        }
    }
}

impl MonitorConfig {
    /// Load the file named by `--config` (or defaults) and apply the
    /// command line overrides on top.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(interval_ms) = args.interval_ms {
            self.monitor.interval_ms = interval_ms;
        }
        if args.cycles.is_some() {
            self.monitor.cycles = args.cycles;
        }
        for category in &args.disable {
            self.link.hardware.insert(category.clone(), false);
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.link.validate()?;
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.monitor.stale_intervals == 0 {
            return Err(ConfigError::ValidationError(
                "stale_intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
