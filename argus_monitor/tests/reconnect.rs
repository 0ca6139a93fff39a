//! Reconnect after the producer exits

#![cfg(unix)]

use argus::config::LinkConfig;
use argus_link::{ArgusLink, CollectingSink, LinkResult, PollOutcome, RawSensor, SensorTypeCode, SnapshotWriter};
use argus_monitor::config::PollSettings;
use argus_monitor::liveness::{CycleWatch, Liveness};
use std::time::Instant;

fn unique_config(tag: &str) -> LinkConfig {
    let base = format!("/argus_reconnect_{}_{tag}", std::process::id());
    LinkConfig {
        mutex_name: format!("{base}_MUTEX"),
        mapping_name: base,
        lock_timeout_ms: 100,
        ..LinkConfig::default()
    }
}

fn load_sensor() -> RawSensor {
    RawSensor::new(SensorTypeCode::CpuLoad, "CPU Load", 12.0, 0, 0)
}

#[test]
fn test_exited_producer_goes_stale_and_reopen_fails() -> LinkResult<()> {
    let config = unique_config("exit");
    let settings = PollSettings {
        interval_ms: 100,
        cycles: None,
        stale_intervals: 3,
    };
    let start = Instant::now();
    let mut watch = CycleWatch::new(settings.stale_after(), start);

    let mut link = ArgusLink::with_config(&config);
    {
        let mut writer = SnapshotWriter::create(&config)?;
        writer.publish(&[load_sensor()])?;
        link.open()?;

        let outcome = link.try_poll(&mut CollectingSink::new())?;
        assert_eq!(watch.observe(&outcome, start), Liveness::Fresh);
    }

    // The held mapping keeps the last snapshot, signature included.
    let outcome = link.try_poll(&mut CollectingSink::new())?;
    assert_eq!(outcome, PollOutcome::NoNewData);
    assert!(link.is_producer_present());

    let later = start + settings.stale_after();
    assert!(matches!(watch.observe(&outcome, later), Liveness::Stale { .. }));

    link.close();
    assert_eq!(link.open().unwrap_err().status_code(), 1);
    assert!(!link.is_open());
    Ok(())
}

#[test]
fn test_restarted_producer_delivers_after_reconnect() -> LinkResult<()> {
    let config = unique_config("restart");
    let mut link = ArgusLink::with_config(&config);
    {
        let mut writer = SnapshotWriter::create(&config)?;
        writer.publish(&[load_sensor()])?;
        link.open()?;
        assert!(link.try_poll(&mut CollectingSink::new())?.has_new_data());
    }
    link.close();

    let mut writer = SnapshotWriter::create(&config)?;
    writer.publish(&[load_sensor()])?;
    link.open()?;

    let mut sink = CollectingSink::new();
    assert!(link.try_poll(&mut sink)?.has_new_data());
    assert!(sink.record_by_id("CPU_Percentage_Load_0_0").is_some());
    Ok(())
}
