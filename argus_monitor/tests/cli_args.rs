//! Argument parsing and config resolution

use argus::config::ConfigError;
use argus_monitor::cli::{Args, OutputFormat};
use argus_monitor::config::{DEFAULT_INTERVAL_MS, MonitorConfig};
use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_without_flags() {
    let args = Args::parse_from(["argus_monitor"]);
    assert_eq!(args.config, None);
    assert_eq!(args.format, OutputFormat::Text);
    assert!(args.disable.is_empty());
    assert!(!args.verbose);
    assert!(!args.json);

    let config = MonitorConfig::resolve(&args).unwrap();
    assert_eq!(config.monitor.interval_ms, DEFAULT_INTERVAL_MS);
    assert!(config.link.hardware.is_empty());
}

#[test]
fn test_json_format_flag() {
    let args = Args::parse_from(["argus_monitor", "--format", "json", "--json", "-v"]);
    assert_eq!(args.format, OutputFormat::Json);
    assert!(args.json);
    assert!(args.verbose);
}

#[test]
fn test_unknown_format_rejected() {
    assert!(Args::try_parse_from(["argus_monitor", "--format", "xml"]).is_err());
}

#[test]
fn test_config_file_with_overrides() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[shared]
log_level = "debug"
service_name = "desk-01"

[link]
lock_timeout_ms = 250

[link.hardware]
Battery = false

[monitor]
interval_ms = 2000
cycles = 10
"#
    )
    .unwrap();

    let path = file.path().to_str().unwrap();
    let args = Args::parse_from(["argus_monitor", "--config", path, "--cycles", "2", "--disable", "Fan"]);
    let config = MonitorConfig::resolve(&args).unwrap();

    assert_eq!(config.shared.service_name, "desk-01");
    assert_eq!(config.link.lock_timeout_ms, 250);
    assert_eq!(config.monitor.interval_ms, 2000);
    assert_eq!(config.monitor.cycles, Some(2));
    assert_eq!(config.link.hardware.get("Battery"), Some(&false));
    assert_eq!(config.link.hardware.get("Fan"), Some(&false));
}

#[test]
fn test_missing_config_file() {
    let args = Args::parse_from(["argus_monitor", "--config", "/nonexistent/argus_monitor.toml"]);
    assert!(matches!(
        MonitorConfig::resolve(&args),
        Err(ConfigError::FileNotFound)
    ));
}

#[test]
fn test_invalid_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[shared\nservice_name = ").unwrap();
    let path = file.path().to_str().unwrap();
    let args = Args::parse_from(["argus_monitor", "--config", path]);
    assert!(matches!(
        MonitorConfig::resolve(&args),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_zero_lock_timeout_fails_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[shared]\nservice_name = \"x\"\n\n[link]\nlock_timeout_ms = 0\n"
    )
    .unwrap();
    let path = file.path().to_str().unwrap();
    let args = Args::parse_from(["argus_monitor", "--config", path]);
    assert!(matches!(
        MonitorConfig::resolve(&args),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_zero_interval_flag_fails_validation() {
    let args = Args::parse_from(["argus_monitor", "--interval-ms", "0"]);
    assert!(matches!(
        MonitorConfig::resolve(&args),
        Err(ConfigError::ValidationError(_))
    ));
}
