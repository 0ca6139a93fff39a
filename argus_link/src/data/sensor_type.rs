//! Raw sensor type codes as written by the producer

/// Sensor type code stored in each raw sensor entry.
///
/// Discriminants follow the producer's enum order. The segment holds the code
/// as a plain `u32`; [`SensorTypeCode::from_raw`] is the only way in, so a
/// foreign value can never become an invalid enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum SensorTypeCode {
    /// Unused slot
    Invalid = 0,
    /// Mainboard or external temperature probe
    Temperature = 1,
    /// Temperature computed by the producer from other sensors
    SyntheticTemperature = 2,
    /// Mainboard fan speed
    FanSpeedRpm = 3,
    /// Mainboard fan control value (PWM/DC percentage)
    FanControlValue = 4,
    /// Network adapter throughput
    NetworkSpeed = 5,
    /// CPU core/package temperature
    CpuTemperature = 6,
    /// Additional CPU temperature (CCD, Tctl, ...)
    CpuTemperatureAdditional = 7,
    /// CPU core multiplier
    CpuMultiplier = 8,
    /// CPU front-side-bus frequency
    CpuFrequencyFsb = 9,
    /// GPU core or memory temperature
    GpuTemperature = 10,
    /// GPU name, carried in the label
    GpuName = 11,
    /// GPU load
    GpuLoad = 12,
    /// GPU core clock
    GpuCoreClock = 13,
    /// GPU memory clock
    GpuMemoryClock = 14,
    /// GPU shader clock
    GpuShaderClock = 15,
    /// GPU fan speed in percent
    GpuFanSpeedPercent = 16,
    /// GPU fan speed
    GpuFanSpeedRpm = 17,
    /// GPU memory used in percent
    GpuMemoryUsedPercent = 18,
    /// GPU memory used in MB
    GpuMemoryUsedMb = 19,
    /// GPU power draw
    GpuPower = 20,
    /// Drive temperature
    DiskTemperature = 21,
    /// Drive transfer rate
    DiskTransferRate = 22,
    /// CPU load
    CpuLoad = 23,
    /// RAM usage (total, used or percentage, told apart by the label)
    RamUsage = 24,
    /// Battery charge
    Battery = 25,
    /// Sentinel that also sizes the producer's per-type tables
    MaxSensors = 26,
}

impl SensorTypeCode {
    /// Every code, in discriminant order.
    pub const ALL: [SensorTypeCode; 27] = [
        Self::Invalid,
        Self::Temperature,
        Self::SyntheticTemperature,
        Self::FanSpeedRpm,
        Self::FanControlValue,
        Self::NetworkSpeed,
        Self::CpuTemperature,
        Self::CpuTemperatureAdditional,
        Self::CpuMultiplier,
        Self::CpuFrequencyFsb,
        Self::GpuTemperature,
        Self::GpuName,
        Self::GpuLoad,
        Self::GpuCoreClock,
        Self::GpuMemoryClock,
        Self::GpuShaderClock,
        Self::GpuFanSpeedPercent,
        Self::GpuFanSpeedRpm,
        Self::GpuMemoryUsedPercent,
        Self::GpuMemoryUsedMb,
        Self::GpuPower,
        Self::DiskTemperature,
        Self::DiskTransferRate,
        Self::CpuLoad,
        Self::RamUsage,
        Self::Battery,
        Self::MaxSensors,
    ];

    /// Convert a raw code from the segment. Unknown values map to `Invalid`.
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        if (value as usize) < Self::ALL.len() {
            Self::ALL[value as usize]
        } else {
            Self::Invalid
        }
    }

    /// Raw code as stored in the segment.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_for_every_code() {
        for (index, code) in SensorTypeCode::ALL.iter().enumerate() {
            assert_eq!(code.as_raw() as usize, index);
            assert_eq!(SensorTypeCode::from_raw(index as u32), *code);
        }
    }

    #[test]
    fn test_unknown_codes_are_invalid() {
        assert_eq!(SensorTypeCode::from_raw(27), SensorTypeCode::Invalid);
        assert_eq!(SensorTypeCode::from_raw(u32::MAX), SensorTypeCode::Invalid);
    }

    #[test]
    fn test_sentinel_matches_table_size() {
        assert_eq!(
            SensorTypeCode::MaxSensors.as_raw() as usize,
            argus::consts::SENSOR_TYPE_COUNT
        );
    }
}
