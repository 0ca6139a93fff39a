//! Sensor aggregation
//!
//! One pass over a snapshot: classify, filter, normalize and emit each raw
//! record, then emit the per-core CPU aggregates collected along the way.
//! Accumulators live only for the duration of one pass.

use crate::classify::{
    AggregateFamily, AggregateStat, HardwareType, SensorType, aggregate_id, classify,
    derived_clock_id, normalize, sensor_id,
};
use crate::data::{ProducerInfo, RawSensor};
use crate::registry::HardwareRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Group of the records describing the producer itself.
pub const ARGUS_INFO_GROUP: &str = "Argus Monitor";

/// Value carried by a [`SensorRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue<'a> {
    /// Reading in canonical units
    Numeric(f64),
    /// Text reading such as a device name or version
    Text(&'a str),
}

impl SensorValue<'_> {
    /// The numeric reading, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// The text reading, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// One classified reading, borrowed for the duration of a sink call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorRecord<'a> {
    /// Stable key, see [`sensor_id`]
    pub id: &'a str,
    /// Display name (the producer's label)
    pub name: &'a str,
    /// Normalized reading
    pub value: SensorValue<'a>,
    /// Quantity kind
    pub sensor_type: SensorType,
    /// Hardware category
    pub hardware: HardwareType,
    /// Group within `(hardware, sensor_type)`
    pub group: &'a str,
    /// Device index
    pub sensor_index: u32,
    /// Reading index within the device
    pub data_index: u32,
}

impl SensorRecord<'_> {
    /// Owned copy that can outlive the sink call.
    pub fn to_owned_record(&self) -> OwnedRecord {
        OwnedRecord {
            id: self.id.to_string(),
            name: self.name.to_string(),
            value: match self.value {
                SensorValue::Numeric(v) => OwnedValue::Numeric(v),
                SensorValue::Text(s) => OwnedValue::Text(s.to_string()),
            },
            sensor_type: self.sensor_type,
            hardware: self.hardware,
            group: self.group.to_string(),
            sensor_index: self.sensor_index,
            data_index: self.data_index,
        }
    }
}

/// Owned form of [`SensorValue`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OwnedValue {
    /// Reading in canonical units
    Numeric(f64),
    /// Text reading
    Text(String),
}

/// Owned form of [`SensorRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedRecord {
    /// Stable key
    pub id: String,
    /// Display name
    pub name: String,
    /// Normalized reading
    pub value: OwnedValue,
    /// Quantity kind
    pub sensor_type: SensorType,
    /// Hardware category
    pub hardware: HardwareType,
    /// Group within `(hardware, sensor_type)`
    pub group: String,
    /// Device index
    pub sensor_index: u32,
    /// Reading index within the device
    pub data_index: u32,
}

impl OwnedRecord {
    /// The numeric reading, if any.
    pub fn numeric(&self) -> Option<f64> {
        match self.value {
            OwnedValue::Numeric(v) => Some(v),
            OwnedValue::Text(_) => None,
        }
    }
}

/// Receiver of one poll's output.
///
/// Records and metrics arrive in emission order. Borrowed data is only valid
/// during the call.
pub trait SensorSink {
    /// A classified raw record.
    fn record(&mut self, record: &SensorRecord<'_>);

    /// A derived aggregate, keyed by id.
    fn metric(&mut self, id: &str, value: f64);
}

/// [`SensorSink`] over a pair of closures.
pub struct FnSink<R, M> {
    on_record: R,
    on_metric: M,
}

impl<R, M> FnSink<R, M>
where
    R: FnMut(&SensorRecord<'_>),
    M: FnMut(&str, f64),
{
    /// Wrap a record callback and a metric callback.
    pub fn new(on_record: R, on_metric: M) -> Self {
        Self {
            on_record,
            on_metric,
        }
    }
}

impl<R, M> SensorSink for FnSink<R, M>
where
    R: FnMut(&SensorRecord<'_>),
    M: FnMut(&str, f64),
{
    fn record(&mut self, record: &SensorRecord<'_>) {
        (self.on_record)(record)
    }

    fn metric(&mut self, id: &str, value: f64) {
        (self.on_metric)(id, value)
    }
}

/// [`SensorSink`] that keeps everything it receives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectingSink {
    /// Records in emission order
    pub records: Vec<OwnedRecord>,
    /// Metrics in emission order
    pub metrics: Vec<(String, f64)>,
}

impl CollectingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// First record with the given id.
    pub fn record_by_id(&self, id: &str) -> Option<&OwnedRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// First metric with the given id.
    pub fn metric_by_id(&self, id: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|(metric_id, _)| metric_id == id)
            .map(|(_, v)| *v)
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.metrics.is_empty()
    }

    /// Drop everything received so far.
    pub fn clear(&mut self) {
        self.records.clear();
        self.metrics.clear();
    }
}

impl SensorSink for CollectingSink {
    fn record(&mut self, record: &SensorRecord<'_>) {
        self.records.push(record.to_owned_record());
    }

    fn metric(&mut self, id: &str, value: f64) {
        self.metrics.push((id.to_string(), value));
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The cycle counter did not move since the last delivered cycle
    NoNewData,
    /// A new cycle was delivered
    Processed {
        /// Records emitted
        records: usize,
        /// Metrics emitted
        metrics: usize,
    },
}

impl PollOutcome {
    /// Whether anything new was delivered.
    pub fn has_new_data(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }
}

/// Min, max and mean of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stats {
    min: f64,
    max: f64,
    average: f64,
}

impl Stats {
    fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
        for v in iter {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
        Some(Self {
            min,
            max,
            average: sum / count as f64,
        })
    }
}

/// Per-core CPU readings collected during one pass.
#[derive(Debug, Default)]
struct CpuAccumulator {
    temperatures: BTreeMap<u32, Vec<f64>>,
    multipliers: BTreeMap<u32, BTreeMap<u32, f64>>,
    fsb: BTreeMap<u32, f64>,
}

impl CpuAccumulator {
    fn observe(&mut self, kind: SensorType, group: &str, core: u32, data_index: u32, value: f64) {
        match (kind, group) {
            (SensorType::Temperature, "Temperature") => {
                self.temperatures.entry(core).or_default().push(value)
            }
            (SensorType::Multiplier, "Multiplier") => {
                self.multipliers
                    .entry(core)
                    .or_default()
                    .insert(data_index, value);
            }
            (SensorType::Frequency, "FSB") => {
                self.fsb.insert(core, value);
            }
            _ => {}
        }
    }

    fn emit(&self, sink: &mut Counting<'_>) {
        for (&core, &fsb) in &self.fsb {
            let Some(multipliers) = self.multipliers.get(&core) else {
                continue;
            };
            let Some(mult) = Stats::of(multipliers.values().copied()) else {
                continue;
            };

            for (&data_index, &multiplier) in multipliers {
                sink.metric(
                    &derived_clock_id(HardwareType::Cpu, core, data_index),
                    multiplier * fsb,
                );
            }

            for (stat, value) in [
                (AggregateStat::Max, mult.max),
                (AggregateStat::Average, mult.average),
                (AggregateStat::Min, mult.min),
            ] {
                sink.metric(&aggregate_id(AggregateFamily::Multiplier, stat, core), value);
                sink.metric(
                    &aggregate_id(AggregateFamily::CoreClock, stat, core),
                    value * fsb,
                );
            }
        }

        for (&core, readings) in &self.temperatures {
            let Some(temp) = Stats::of(readings.iter().copied()) else {
                continue;
            };
            for (stat, value) in [
                (AggregateStat::Max, temp.max),
                (AggregateStat::Average, temp.average),
                (AggregateStat::Min, temp.min),
            ] {
                sink.metric(&aggregate_id(AggregateFamily::Temperature, stat, core), value);
            }
        }
    }
}

/// Sink wrapper that counts what passes through.
struct Counting<'s> {
    inner: &'s mut dyn SensorSink,
    records: usize,
    metrics: usize,
}

impl Counting<'_> {
    fn record(&mut self, record: &SensorRecord<'_>) {
        self.records += 1;
        self.inner.record(record);
    }

    fn metric(&mut self, id: &str, value: f64) {
        self.metrics += 1;
        self.inner.metric(id, value);
    }
}

/// Turns one snapshot's raw records into sink calls.
pub struct Aggregator<'r> {
    registry: &'r HardwareRegistry,
}

impl<'r> Aggregator<'r> {
    /// Aggregator filtering by `registry`.
    pub fn new(registry: &'r HardwareRegistry) -> Self {
        Self { registry }
    }

    /// Process one cycle and return what was emitted.
    ///
    /// Always yields [`PollOutcome::Processed`]; staleness is decided by the
    /// caller before the snapshot gets here.
    pub fn process(
        &self,
        info: &ProducerInfo,
        sensors: &[RawSensor],
        sink: &mut dyn SensorSink,
    ) -> PollOutcome {
        let mut sink = Counting {
            inner: sink,
            records: 0,
            metrics: 0,
        };

        if self.registry.is_enabled(HardwareType::ArgusMonitor.as_str()) {
            emit_producer_info(info, &mut sink);
        }

        let mut cpu = CpuAccumulator::default();
        for sensor in sensors {
            self.process_sensor(sensor, &mut cpu, &mut sink);
        }
        cpu.emit(&mut sink);

        trace!(
            cycle = info.cycle_counter,
            records = sink.records,
            metrics = sink.metrics,
            "cycle processed"
        );
        PollOutcome::Processed {
            records: sink.records,
            metrics: sink.metrics,
        }
    }

    fn process_sensor(&self, sensor: &RawSensor, cpu: &mut CpuAccumulator, sink: &mut Counting<'_>) {
        let label = sensor.label();
        let class = classify(sensor.code(), &label);
        if !self.registry.is_enabled(class.hardware.as_str()) {
            return;
        }

        let sensor_index = sensor.sensor_index();
        let data_index = sensor.data_index();
        let id = sensor_id(class.hardware, class.kind, class.group, sensor_index, data_index);

        if class.kind == SensorType::Text {
            sink.record(&SensorRecord {
                id: &id,
                name: class.group,
                value: SensorValue::Text(&label),
                sensor_type: class.kind,
                hardware: class.hardware,
                group: class.group,
                sensor_index,
                data_index,
            });
            return;
        }

        let value = normalize(sensor.value(), class.kind);
        // Unpopulated probes report 0 or less.
        if class.kind == SensorType::Temperature && (value <= 0.0 || value.is_nan()) {
            return;
        }

        sink.record(&SensorRecord {
            id: &id,
            name: &label,
            value: SensorValue::Numeric(value),
            sensor_type: class.kind,
            hardware: class.hardware,
            group: class.group,
            sensor_index,
            data_index,
        });

        if class.hardware == HardwareType::Cpu {
            cpu.observe(class.kind, class.group, sensor_index, data_index, value);
        }
    }
}

fn emit_producer_info(info: &ProducerInfo, sink: &mut Counting<'_>) {
    let entries = [
        ("Argus Monitor Version", info.version_string()),
        ("Argus Monitor Build", info.build.to_string()),
        ("Argus Data API Version", info.api_version.to_string()),
        (
            "ArgusMonitorLink Version",
            env!("CARGO_PKG_VERSION").to_string(),
        ),
        ("Available Sensors", info.total_sensor_count.to_string()),
    ];

    for (data_index, (name, text)) in (0u32..).zip(entries.iter()) {
        let id = sensor_id(
            HardwareType::ArgusMonitor,
            SensorType::Text,
            ARGUS_INFO_GROUP,
            0,
            data_index,
        );
        sink.record(&SensorRecord {
            id: &id,
            name,
            value: SensorValue::Text(text),
            sensor_type: SensorType::Text,
            hardware: HardwareType::ArgusMonitor,
            group: ARGUS_INFO_GROUP,
            sensor_index: 0,
            data_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SensorTypeCode;

    fn info(total: u32) -> ProducerInfo {
        ProducerInfo {
            major: 7,
            minor_a: 1,
            minor_b: 3,
            build: 3180,
            api_version: 2,
            total_sensor_count: total,
            cycle_counter: 1,
            ..ProducerInfo::default()
        }
    }

    fn without_info() -> HardwareRegistry {
        let mut registry = HardwareRegistry::new();
        registry.set_enabled("ArgusMonitor", false);
        registry
    }

    fn run(registry: &HardwareRegistry, sensors: &[RawSensor]) -> (PollOutcome, CollectingSink) {
        let mut sink = CollectingSink::new();
        let outcome =
            Aggregator::new(registry).process(&info(sensors.len() as u32), sensors, &mut sink);
        (outcome, sink)
    }

    #[test]
    fn test_producer_info_records() {
        let registry = HardwareRegistry::new();
        let (outcome, sink) = run(&registry, &[]);

        assert_eq!(
            outcome,
            PollOutcome::Processed {
                records: 5,
                metrics: 0
            }
        );
        let names: Vec<_> = sink.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Argus Monitor Version",
                "Argus Monitor Build",
                "Argus Data API Version",
                "ArgusMonitorLink Version",
                "Available Sensors",
            ]
        );
        let version = sink
            .record_by_id("ArgusMonitor_Text_Argus Monitor_0_0")
            .unwrap();
        assert_eq!(version.value, OwnedValue::Text("7.1.3".to_string()));
        assert_eq!(
            sink.records[3].value,
            OwnedValue::Text(env!("CARGO_PKG_VERSION").to_string())
        );
        assert!(sink.records.iter().all(|r| r.group == ARGUS_INFO_GROUP));
        assert_eq!(sink.records[4].data_index, 4);
    }

    #[test]
    fn test_temperature_aggregates() {
        let sensors = [
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 40.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 1", 50.0, 0, 1),
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 2", 60.0, 0, 2),
        ];
        let (_, sink) = run(&without_info(), &sensors);

        assert_eq!(sink.records.len(), 3);
        assert_eq!(
            sink.metrics,
            vec![
                ("CPU_Temperature_Temperature_Max_0".to_string(), 60.0),
                ("CPU_Temperature_Temperature_Average_0".to_string(), 50.0),
                ("CPU_Temperature_Temperature_Min_0".to_string(), 40.0),
            ]
        );
    }

    #[test]
    fn test_derived_clocks_and_multiplier_aggregates() {
        let sensors = [
            RawSensor::new(SensorTypeCode::CpuFrequencyFsb, "FSB", 100.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuMultiplier, "Core 0", 30.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuMultiplier, "Core 1", 35.0, 0, 1),
            RawSensor::new(SensorTypeCode::CpuMultiplier, "Core 2", 40.0, 0, 2),
        ];
        let (outcome, sink) = run(&without_info(), &sensors);

        assert_eq!(
            outcome,
            PollOutcome::Processed {
                records: 4,
                metrics: 9
            }
        );
        let expected = [
            ("CPU_Frequency_Core_Clock_0_0", 3.0e9),
            ("CPU_Frequency_Core_Clock_0_1", 3.5e9),
            ("CPU_Frequency_Core_Clock_0_2", 4.0e9),
            ("CPU_Multiplier_Multiplier_Max_0", 40.0),
            ("CPU_Frequency_Core_Clock_Max_0", 4.0e9),
            ("CPU_Multiplier_Multiplier_Average_0", 35.0),
            ("CPU_Frequency_Core_Clock_Average_0", 3.5e9),
            ("CPU_Multiplier_Multiplier_Min_0", 30.0),
            ("CPU_Frequency_Core_Clock_Min_0", 3.0e9),
        ];
        let got: Vec<_> = sink.metrics.iter().map(|(id, v)| (id.as_str(), *v)).collect();
        assert_eq!(got, expected);

        let fsb = sink.record_by_id("CPU_Frequency_FSB_0_0").unwrap();
        assert_eq!(fsb.numeric(), Some(1.0e8));
    }

    #[test]
    fn test_no_clock_aggregates_without_fsb() {
        let sensors = [
            RawSensor::new(SensorTypeCode::CpuMultiplier, "Core 0", 30.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuMultiplier, "Core 1", 35.0, 0, 1),
        ];
        let (_, sink) = run(&without_info(), &sensors);
        assert_eq!(sink.records.len(), 2);
        assert!(sink.metrics.is_empty());
    }

    #[test]
    fn test_aggregates_per_core() {
        let sensors = [
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 45.0, 1, 0),
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 55.0, 0, 0),
        ];
        let (_, sink) = run(&without_info(), &sensors);
        let ids: Vec<_> = sink.metrics.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "CPU_Temperature_Temperature_Max_0",
                "CPU_Temperature_Temperature_Average_0",
                "CPU_Temperature_Temperature_Min_0",
                "CPU_Temperature_Temperature_Max_1",
                "CPU_Temperature_Temperature_Average_1",
                "CPU_Temperature_Temperature_Min_1",
            ]
        );
        assert_eq!(sink.metric_by_id("CPU_Temperature_Temperature_Average_1"), Some(45.0));
    }

    #[test]
    fn test_additional_temperature_not_aggregated() {
        let sensors = [RawSensor::new(
            SensorTypeCode::CpuTemperatureAdditional,
            "Package",
            70.0,
            0,
            0,
        )];
        let (_, sink) = run(&without_info(), &sensors);
        assert_eq!(sink.records.len(), 1);
        assert!(sink.metrics.is_empty());
    }

    #[test]
    fn test_non_positive_temperatures_skipped() {
        let sensors = [
            RawSensor::new(SensorTypeCode::DiskTemperature, "Disk", 0.0, 0, 0),
            RawSensor::new(SensorTypeCode::Temperature, "Probe", -5.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 0.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuLoad, "Load", 0.0, 0, 0),
        ];
        let (_, sink) = run(&without_info(), &sensors);
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].id, "CPU_Percentage_Load_0_0");
        assert!(sink.metrics.is_empty());
    }

    #[test]
    fn test_disabled_category_suppressed() {
        let sensors = [
            RawSensor::new(SensorTypeCode::GpuTemperature, "GPU", 65.0, 0, 0),
            RawSensor::new(SensorTypeCode::GpuLoad, "GPU Load", 30.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuLoad, "CPU Load", 10.0, 0, 0),
        ];
        let mut registry = without_info();
        registry.set_enabled("GPU", false);
        let (_, sink) = run(&registry, &sensors);

        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].hardware, HardwareType::Cpu);
    }

    #[test]
    fn test_disabled_cpu_suppresses_aggregates() {
        let sensors = [RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 40.0, 0, 0)];
        let mut registry = without_info();
        registry.set_enabled("CPU", false);
        let (outcome, sink) = run(&registry, &sensors);
        assert!(sink.is_empty());
        assert_eq!(
            outcome,
            PollOutcome::Processed {
                records: 0,
                metrics: 0
            }
        );
    }

    #[test]
    fn test_text_record_uses_group_as_name() {
        let sensors = [RawSensor::new(SensorTypeCode::GpuName, "GeForce RTX 4070", 0.0, 0, 0)];
        let (_, sink) = run(&without_info(), &sensors);
        let record = &sink.records[0];
        assert_eq!(record.name, "Name");
        assert_eq!(record.value, OwnedValue::Text("GeForce RTX 4070".to_string()));
        assert_eq!(record.id, "GPU_Text_Name_0_0");
    }

    #[test]
    fn test_invalid_slots_ignored() {
        let sensors = [RawSensor::EMPTY, RawSensor::EMPTY];
        let (_, sink) = run(&without_info(), &sensors);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_category_delivered_when_enabled() {
        let sensors = [
            RawSensor::new(SensorTypeCode::Invalid, "", 3.0, 1, 2),
            RawSensor::new(SensorTypeCode::CpuLoad, "CPU Load", 10.0, 0, 0),
        ];
        let mut registry = without_info();
        registry.set_enabled("Invalid", true);
        let (_, sink) = run(&registry, &sensors);

        assert_eq!(sink.records.len(), 2);
        let record = &sink.records[0];
        assert_eq!(record.hardware, HardwareType::Invalid);
        assert_eq!(record.id, "Invalid_Invalid_Invalid_1_2");
        assert_eq!(record.numeric(), Some(3.0));
    }

    #[test]
    fn test_records_keep_storage_order() {
        let sensors = [
            RawSensor::new(SensorTypeCode::NetworkSpeed, "eth0", 131_072.0, 0, 0),
            RawSensor::new(SensorTypeCode::RamUsage, "Total RAM", 1024.0, 0, 0),
            RawSensor::new(SensorTypeCode::FanSpeedRpm, "Fan 1", 900.0, 0, 1),
        ];
        let (_, sink) = run(&without_info(), &sensors);
        let ids: Vec<_> = sink.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "Network_Transfer_Network_0_0",
                "RAM_Total_RAM_0_0",
                "Fan_RPM_RPM_0_1"
            ]
        );
        assert_eq!(sink.records[0].numeric(), Some(1_000_000.0));
        assert_eq!(sink.records[1].numeric(), Some(1_000_000_000.0));
    }

    #[test]
    fn test_fn_sink_forwards() {
        let registry = without_info();
        let sensors = [RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 42.0, 0, 0)];
        let mut ids = Vec::new();
        let mut metrics = 0;
        let mut sink = FnSink::new(|r: &SensorRecord<'_>| ids.push(r.id.to_string()), |_: &str, _| {
            metrics += 1
        });
        Aggregator::new(&registry).process(&info(1), &sensors, &mut sink);
        drop(sink);
        assert_eq!(ids, ["CPU_Temperature_Temperature_0_0"]);
        assert_eq!(metrics, 3);
    }

    #[test]
    fn test_stats_empty_is_none() {
        assert_eq!(Stats::of(std::iter::empty()), None);
        let stats = Stats::of([2.0, 4.0]).unwrap();
        assert_eq!((stats.min, stats.max, stats.average), (2.0, 4.0, 3.0));
    }

    #[test]
    fn test_record_serializes_flat_value() {
        let record = SensorRecord {
            id: "CPU_Percentage_Load_0_0",
            name: "Load",
            value: SensorValue::Numeric(12.5),
            sensor_type: SensorType::Percentage,
            hardware: HardwareType::Cpu,
            group: "Load",
            sensor_index: 0,
            data_index: 0,
        };
        assert_eq!(record.value.as_f64(), Some(12.5));
        assert_eq!(record.value.as_text(), None);
        let owned = record.to_owned_record();
        assert_eq!(owned.hardware, HardwareType::Cpu);
        assert_eq!(owned.numeric(), Some(12.5));
    }
}
