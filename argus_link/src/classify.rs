//! Classification table
//!
//! Maps a raw sensor type code and its label onto the
//! `(hardware, sensor type, group)` taxonomy hosts consume, normalizes raw
//! readings into canonical units and builds the identifiers records are keyed
//! by. Everything here is pure.

use crate::data::SensorTypeCode;
use serde::{Serialize, Serializer};
use std::fmt;

/// Top-level hardware category of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HardwareType {
    /// Processor
    Cpu,
    /// Graphics card
    Gpu,
    /// System memory
    Ram,
    /// Mainboard fans
    Fan,
    /// Storage drives
    Drive,
    /// Network adapters
    Network,
    /// Battery
    Battery,
    /// Stand-alone temperature probes
    Temperature,
    /// Records describing the producer itself
    ArgusMonitor,
    /// Unknown or unused slot
    Invalid,
}

impl HardwareType {
    /// Name used in ids, callbacks and the enablement registry.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
            Self::Ram => "RAM",
            Self::Fan => "Fan",
            Self::Drive => "Drive",
            Self::Network => "Network",
            Self::Battery => "Battery",
            Self::Temperature => "Temperature",
            Self::ArgusMonitor => "ArgusMonitor",
            Self::Invalid => "Invalid",
        }
    }
}

/// Physical quantity a sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorType {
    /// Degrees Celsius
    Temperature,
    /// Core multiplier
    Multiplier,
    /// Clock frequency, normalized to Hz
    Frequency,
    /// Percentage
    Percentage,
    /// Revolutions per minute
    Rpm,
    /// Text carried in the label
    Text,
    /// Load
    Load,
    /// Watts
    Power,
    /// Memory in use, normalized to bytes
    Usage,
    /// Memory installed, normalized to bytes
    Total,
    /// Throughput, normalized to bits per second
    Transfer,
    /// Plain number
    Numeric,
    /// Unknown or unused slot
    Invalid,
}

impl SensorType {
    /// Name used in ids and callbacks.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Multiplier => "Multiplier",
            Self::Frequency => "Frequency",
            Self::Percentage => "Percentage",
            Self::Rpm => "RPM",
            Self::Text => "Text",
            Self::Load => "Load",
            Self::Power => "Power",
            Self::Usage => "Usage",
            Self::Total => "Total",
            Self::Transfer => "Transfer",
            Self::Numeric => "Numeric",
            Self::Invalid => "Invalid",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(HardwareType, SensorType);

/// Result of classifying one raw sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    /// Hardware category
    pub hardware: HardwareType,
    /// Quantity kind
    pub kind: SensorType,
    /// Disambiguator within `(hardware, kind)`
    pub group: &'static str,
}

impl Classification {
    const fn new(hardware: HardwareType, kind: SensorType, group: &'static str) -> Self {
        Self {
            hardware,
            kind,
            group,
        }
    }

    /// Classification of unused or unknown slots.
    pub const INVALID: Classification =
        Classification::new(HardwareType::Invalid, SensorType::Invalid, "Invalid");
}

/// Classify a raw sensor.
///
/// Total over every code. The label only matters for GPU temperatures
/// (core vs. memory) and RAM usage (total vs. used vs. percentage).
pub fn classify(code: SensorTypeCode, label: &str) -> Classification {
    use HardwareType as H;
    use SensorType as S;
    use SensorTypeCode as C;

    match code {
        C::CpuTemperature => Classification::new(H::Cpu, S::Temperature, "Temperature"),
        C::CpuTemperatureAdditional => {
            Classification::new(H::Cpu, S::Temperature, "Additional Temperature")
        }
        C::CpuMultiplier => Classification::new(H::Cpu, S::Multiplier, "Multiplier"),
        C::CpuFrequencyFsb => Classification::new(H::Cpu, S::Frequency, "FSB"),
        C::CpuLoad => Classification::new(H::Cpu, S::Percentage, "Load"),

        C::GpuName => Classification::new(H::Gpu, S::Text, "Name"),
        C::GpuTemperature if label.contains("Memory") => {
            Classification::new(H::Gpu, S::Temperature, "Memory")
        }
        C::GpuTemperature => Classification::new(H::Gpu, S::Temperature, "GPU"),
        C::GpuFanSpeedPercent => Classification::new(H::Gpu, S::Percentage, "Fan"),
        C::GpuFanSpeedRpm => Classification::new(H::Gpu, S::Rpm, "Fan"),
        C::GpuCoreClock => Classification::new(H::Gpu, S::Frequency, "GPU"),
        C::GpuMemoryClock => Classification::new(H::Gpu, S::Frequency, "Memory"),
        C::GpuShaderClock => Classification::new(H::Gpu, S::Frequency, "Share"),
        C::GpuMemoryUsedPercent => Classification::new(H::Gpu, S::Percentage, "Memory"),
        C::GpuMemoryUsedMb => Classification::new(H::Gpu, S::Usage, "Memory"),
        C::GpuLoad => Classification::new(H::Gpu, S::Load, "GPU"),
        C::GpuPower => Classification::new(H::Gpu, S::Power, "GPU"),

        C::FanControlValue => Classification::new(H::Fan, S::Percentage, "Power"),
        C::FanSpeedRpm => Classification::new(H::Fan, S::Rpm, "RPM"),

        C::RamUsage if label.contains("Total") => Classification::new(H::Ram, S::Total, "RAM"),
        C::RamUsage if label.contains("Used") => Classification::new(H::Ram, S::Usage, "RAM"),
        C::RamUsage => Classification::new(H::Ram, S::Percentage, "RAM"),

        C::DiskTemperature => Classification::new(H::Drive, S::Temperature, "Drive"),
        C::DiskTransferRate => Classification::new(H::Drive, S::Transfer, "Drive"),

        C::NetworkSpeed => Classification::new(H::Network, S::Transfer, "Network"),

        C::Battery => Classification::new(H::Battery, S::Percentage, "Battery"),

        C::Temperature => {
            Classification::new(H::Temperature, S::Temperature, "Temperature Sensor")
        }
        C::SyntheticTemperature => {
            Classification::new(H::Temperature, S::Temperature, "Synthetic Temperature")
        }

        C::MaxSensors => Classification::new(H::ArgusMonitor, S::Numeric, "Sensor"),

        C::Invalid => Classification::INVALID,
    }
}

/// Scale a raw reading into the canonical unit of its sensor type.
///
/// - Transfer: MB/s → bit/s in binary units, `v * 1_000_000 / 131_072`
/// - Frequency: MHz → Hz
/// - Usage, Total: `v * 1_000_000_000 / 1024`
/// - anything else passes through
pub fn normalize(value: f32, kind: SensorType) -> f64 {
    let value = f64::from(value);
    match kind {
        SensorType::Transfer => value * 1_000_000.0 / 131_072.0,
        SensorType::Frequency => value * 1_000_000.0,
        SensorType::Usage | SensorType::Total => value * 1_000_000_000.0 / 1024.0,
        _ => value,
    }
}

/// Key of a raw sensor record: `{hw}_{type}_{group}_{sensor}_{data}`.
pub fn sensor_id(
    hardware: HardwareType,
    kind: SensorType,
    group: &str,
    sensor_index: u32,
    data_index: u32,
) -> String {
    format!("{hardware}_{kind}_{group}_{sensor_index}_{data_index}")
}

/// Key of the clock derived from one multiplier reading.
pub fn derived_clock_id(hardware: HardwareType, sensor_index: u32, data_index: u32) -> String {
    format!("{hardware}_Frequency_Core_Clock_{sensor_index}_{data_index}")
}

/// Family of a per-core aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFamily {
    /// Core multipliers
    Multiplier,
    /// Effective core clock (multiplier × FSB)
    CoreClock,
    /// Core temperatures
    Temperature,
}

/// Statistic of a per-core aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateStat {
    /// Largest reading
    Max,
    /// Arithmetic mean
    Average,
    /// Smallest reading
    Min,
}

/// Key of a per-core aggregate, e.g. `CPU_Temperature_Temperature_Max_0`.
pub fn aggregate_id(family: AggregateFamily, stat: AggregateStat, core: u32) -> String {
    let prefix = match family {
        AggregateFamily::Multiplier => "CPU_Multiplier_Multiplier",
        AggregateFamily::CoreClock => "CPU_Frequency_Core_Clock",
        AggregateFamily::Temperature => "CPU_Temperature_Temperature",
    };
    let stat = match stat {
        AggregateStat::Max => "Max",
        AggregateStat::Average => "Average",
        AggregateStat::Min => "Min",
    };
    format!("{prefix}_{stat}_{core}")
}
