//! Memory layout of the producer's segment
//!
//! Both structs mirror the producer's packed C layout. Every field sits on its
//! natural alignment there, so `repr(C)` reproduces it exactly; the sizes are
//! pinned at compile time.

use super::sensor_type::SensorTypeCode;
use argus::consts::{
    ARGUS_SIGNATURE, MAX_LEN_SENSOR_LABEL, MAX_LEN_UNIT_STRING, MAX_SENSOR_COUNT,
    SENSOR_TYPE_COUNT,
};
use serde::Serialize;
use static_assertions::const_assert_eq;
use std::mem::{offset_of, size_of};

/// One sensor entry as the producer lays it out.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct RawSensor {
    sensor_type: u32,
    label: [u16; MAX_LEN_SENSOR_LABEL],
    unit: [u16; MAX_LEN_UNIT_STRING],
    value: f32,
    data_index: u32,
    sensor_index: u32,
}

const_assert_eq!(size_of::<RawSensor>(), 208);
const_assert_eq!(offset_of!(RawSensor, value), 196);

impl RawSensor {
    /// Empty slot.
    pub const EMPTY: RawSensor = RawSensor {
        sensor_type: 0,
        label: [0; MAX_LEN_SENSOR_LABEL],
        unit: [0; MAX_LEN_UNIT_STRING],
        value: 0.0,
        data_index: 0,
        sensor_index: 0,
    };

    /// Build an entry the way the producer fills one.
    ///
    /// Labels longer than the slot are cut so that the terminator fits.
    pub fn new(
        code: SensorTypeCode,
        label: &str,
        value: f32,
        sensor_index: u32,
        data_index: u32,
    ) -> Self {
        let mut sensor = Self::EMPTY;
        sensor.sensor_type = code.as_raw();
        encode_wide(label, &mut sensor.label);
        sensor.value = value;
        sensor.sensor_index = sensor_index;
        sensor.data_index = data_index;
        sensor
    }

    /// Same entry with a unit string attached.
    pub fn with_unit(mut self, unit: &str) -> Self {
        encode_wide(unit, &mut self.unit);
        self
    }

    /// Sensor type code, `Invalid` for values this crate does not know.
    #[inline]
    pub fn code(&self) -> SensorTypeCode {
        SensorTypeCode::from_raw(self.sensor_type)
    }

    /// Raw sensor type code as stored.
    #[inline]
    pub fn raw_code(&self) -> u32 {
        self.sensor_type
    }

    /// Label text up to the first NUL.
    pub fn label(&self) -> String {
        decode_wide(&self.label)
    }

    /// Unit text up to the first NUL.
    pub fn unit(&self) -> String {
        decode_wide(&self.unit)
    }

    /// Reading in the producer's native unit.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Index of the physical device (CPU package, GPU, drive, ...).
    #[inline]
    pub fn sensor_index(&self) -> u32 {
        self.sensor_index
    }

    /// Index of the reading within its device.
    #[inline]
    pub fn data_index(&self) -> u32 {
        self.data_index
    }
}

/// The whole segment as the producer lays it out.
#[derive(Debug, Clone)]
#[repr(C)]
pub struct RawSnapshot {
    /// Must equal [`ARGUS_SIGNATURE`] for the rest to be trusted
    pub signature: u32,
    /// Producer major version
    pub argus_major: u8,
    /// Producer minor version
    pub argus_minor_a: u8,
    /// Producer patch version
    pub argus_minor_b: u8,
    /// Producer extra version byte
    pub argus_extra: u8,
    /// Producer build number
    pub argus_build: u32,
    /// Version of the data interface
    pub version: u32,
    /// Incremented once per measurement pass
    pub cycle_counter: u32,
    /// Index of the first entry of each sensor type
    pub offset_for_sensor_type: [u32; SENSOR_TYPE_COUNT],
    /// Number of entries of each sensor type
    pub sensor_count: [u32; SENSOR_TYPE_COUNT],
    /// Number of valid entries in `sensors`
    pub total_sensor_count: u32,
    /// Sensor entries in producer order
    pub sensors: [RawSensor; MAX_SENSOR_COUNT],
}

const_assert_eq!(offset_of!(RawSnapshot, cycle_counter), 16);
const_assert_eq!(offset_of!(RawSnapshot, total_sensor_count), 228);
const_assert_eq!(offset_of!(RawSnapshot, sensors), 232);
const_assert_eq!(
    size_of::<RawSnapshot>(),
    232 + MAX_SENSOR_COUNT * size_of::<RawSensor>()
);

impl RawSnapshot {
    /// Size of the layout in bytes.
    pub const SIZE: usize = size_of::<RawSnapshot>();

    /// Byte offset of the signature field.
    pub const SIGNATURE_OFFSET: usize = offset_of!(RawSnapshot, signature);

    /// Byte offset of the cycle counter field.
    pub const CYCLE_COUNTER_OFFSET: usize = offset_of!(RawSnapshot, cycle_counter);

    /// Heap-allocated, all-zero snapshot.
    pub fn boxed_zeroed() -> Box<Self> {
        let zeroed = Box::<Self>::new_zeroed();
        // SAFETY: every field is an integer, a float or an array of those, so
        // the all-zero bit pattern is a valid value.
        unsafe { zeroed.assume_init() }
    }

    /// Whether the signature matches the producer's.
    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == ARGUS_SIGNATURE
    }

    /// Valid entries in producer order.
    ///
    /// A count beyond the array capacity is clamped rather than trusted.
    pub fn sensors(&self) -> &[RawSensor] {
        let count = (self.total_sensor_count as usize).min(MAX_SENSOR_COUNT);
        &self.sensors[..count]
    }

    /// Copy of the header fields.
    pub fn producer_info(&self) -> ProducerInfo {
        ProducerInfo {
            major: self.argus_major,
            minor_a: self.argus_minor_a,
            minor_b: self.argus_minor_b,
            extra: self.argus_extra,
            build: self.argus_build,
            api_version: self.version,
            total_sensor_count: self.total_sensor_count,
            cycle_counter: self.cycle_counter,
        }
    }
}

/// Producer header fields, copied out of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProducerInfo {
    /// Producer major version
    pub major: u8,
    /// Producer minor version
    pub minor_a: u8,
    /// Producer patch version
    pub minor_b: u8,
    /// Producer extra version byte
    pub extra: u8,
    /// Producer build number
    pub build: u32,
    /// Version of the data interface
    pub api_version: u32,
    /// Number of valid sensor entries
    pub total_sensor_count: u32,
    /// Cycle counter at the time of the copy
    pub cycle_counter: u32,
}

impl ProducerInfo {
    /// `major.minor_a.minor_b`, the way the producer shows its version.
    pub fn version_string(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor_a, self.minor_b)
    }
}

fn encode_wide(text: &str, slot: &mut [u16]) {
    slot.fill(0);
    let capacity = slot.len().saturating_sub(1);
    for (dst, unit) in slot.iter_mut().take(capacity).zip(text.encode_utf16()) {
        *dst = unit;
    }
}

fn decode_wide(slot: &[u16]) -> String {
    let end = slot.iter().position(|&c| c == 0).unwrap_or(slot.len());
    String::from_utf16_lossy(&slot[..end])
}
