//! Prelude module for common re-exports.
//!
//! ```rust
//! use argus_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LinkConfig, LogLevel, SharedConfig};

// ─── Producer Interface ─────────────────────────────────────────────
pub use crate::consts::{
    ARGUS_SIGNATURE, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAPPING_NAME, DEFAULT_MUTEX_NAME,
    KNOWN_HARDWARE, MAPPING_SIZE, MAX_SENSOR_COUNT,
};
