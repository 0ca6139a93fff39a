//! # Argus Monitor CLI
//!
//! Host binary for the link: loads a TOML config, opens the producer's
//! segment, polls it at a fixed interval and prints every delivered cycle as
//! text or JSON lines.
//!
//! - [`cli`] - command line arguments
//! - [`config`] - file configuration and argument overrides
//! - [`liveness`] - stale producer detection
//! - [`output`] - cycle rendering

pub mod cli;
pub mod config;
pub mod liveness;
pub mod output;
