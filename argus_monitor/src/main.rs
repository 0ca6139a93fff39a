//! # Argus Monitor
//!
//! Polls Argus Monitor's shared memory segment and prints every new cycle.
//! Waits for the producer if it is not running yet, reconnects once the cycle
//! counter has stood still for `stale_intervals` polls, and shuts down
//! cleanly on Ctrl-C.

use argus::config::LogLevel;
use argus_link::{ArgusLink, CollectingSink, LinkError, PollOutcome};
use argus_monitor::cli::Args;
use argus_monitor::config::MonitorConfig;
use argus_monitor::liveness::{CycleWatch, Liveness};
use argus_monitor::output::write_cycle;
use clap::Parser;
use std::io::Write;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    let config = MonitorConfig::resolve(&args);
    let log_level = config
        .as_ref()
        .map(|config| config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("Argus Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = match config {
        Ok(config) => run(&args, &config),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Argus Monitor shutdown complete");
}

fn run(args: &Args, config: &MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, segment={}, interval={}ms",
        config.shared.service_name, config.link.mapping_name, config.monitor.interval_ms,
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut link = ArgusLink::with_config(&config.link);
    let disabled: Vec<&str> = link
        .registry()
        .iter()
        .filter(|(_, enabled)| !enabled)
        .map(|(name, _)| name)
        .collect();
    if !disabled.is_empty() {
        info!("Disabled categories: {}", disabled.join(", "));
    }

    let mut watch = CycleWatch::new(config.monitor.stale_after(), Instant::now());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut delivered = 0u64;
    let mut waiting_reported = false;

    while running.load(Ordering::SeqCst) {
        if !link.is_open() {
            match link.open() {
                Ok(()) => {
                    waiting_reported = false;
                    watch.reset(Instant::now());
                    if let Ok(producer) = link.producer_info() {
                        info!(
                            "Connected to Argus Monitor {} (build {}, {} sensors)",
                            producer.version_string(),
                            producer.build,
                            producer.total_sensor_count,
                        );
                    }
                }
                Err(e) if !waiting_reported => {
                    warn!(code = e.status_code(), "Waiting for producer: {e}");
                    waiting_reported = true;
                }
                Err(e) => debug!(code = e.status_code(), "Producer still unavailable: {e}"),
            }
        }

        if link.is_open() {
            let mut sink = CollectingSink::new();
            match link.try_poll(&mut sink) {
                Ok(PollOutcome::Processed { records, metrics }) => {
                    watch.reset(Instant::now());
                    write_cycle(&mut out, args.format, link.last_seen_cycle(), &sink)?;
                    out.flush()?;
                    delivered += 1;
                    debug!(records, metrics, "cycle {} delivered", link.last_seen_cycle());

                    if config.monitor.cycles.is_some_and(|limit| delivered >= limit) {
                        break;
                    }
                }
                Ok(outcome @ PollOutcome::NoNewData) => {
                    if let Liveness::Stale { age_ms } = watch.observe(&outcome, Instant::now()) {
                        warn!("No new cycle for {age_ms} ms, reconnecting");
                        link.close();
                    }
                }
                Err(e @ LinkError::LockTimeout { .. }) => warn!("Poll skipped: {e}"),
                Err(e) if e.is_producer_absent() => {
                    warn!("Producer went away: {e}");
                    link.close();
                }
                Err(e) => return Err(e.into()),
            }
        }

        std::thread::sleep(config.monitor.interval());
    }

    let status = link.close();
    if !status.is_empty() {
        warn!(code = status.legacy_code(), "Link closed with errors: {status:?}");
    }
    info!("{delivered} cycles delivered");
    Ok(())
}

fn setup_tracing(args: &Args, log_level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        log_level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // Readings go to stdout; logs stay on stderr.
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
