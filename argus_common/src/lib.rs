//! Argus Common Library
//!
//! Shared constants and configuration loading for the Argus Monitor link
//! workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Producer interface constants (names, signature, capacities)
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use argus_common::consts::ARGUS_SIGNATURE;
//! use argus_common::config::{ConfigLoader, LinkConfig};
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
