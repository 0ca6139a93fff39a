//! Command line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format of delivered cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One aligned line per reading
    #[default]
    Text,
    /// One JSON object per cycle
    Json,
}

/// Argus Monitor link: print live sensor readings
#[derive(Parser, Debug)]
#[command(name = "argus_monitor")]
#[command(author = "Zeanon")]
#[command(version)]
#[command(about = "Poll Argus Monitor's shared memory and print sensor readings")]
pub struct Args {
    /// Path to the TOML configuration. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds (overrides the config file).
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Stop after this many delivered cycles.
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Hardware category to suppress; repeatable (e.g. `--disable GPU`).
    #[arg(long, value_name = "CATEGORY")]
    pub disable: Vec<String>,

    /// Output format of the readings.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    pub verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    pub json: bool,
}
