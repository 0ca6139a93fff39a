//! Constants of the Argus Monitor data interface.
//!
//! Single source of truth for segment names, the validation signature and
//! the fixed capacities of the producer's memory layout. The values must match
//! the producer bit-for-bit; the layout structs in `argus_link::data` assert
//! their sizes against these.

/// Signature the producer writes at offset 0 of a live segment (`"ArgM"`
/// little-endian).
pub const ARGUS_SIGNATURE: u32 = 0x4D67_7241;

/// Capacity of the sensor array in the snapshot.
pub const MAX_SENSOR_COUNT: usize = 512;

/// Length of a sensor label in UTF-16 code units, including the terminator.
pub const MAX_LEN_SENSOR_LABEL: usize = 64;

/// Length of a unit string in UTF-16 code units, including the terminator.
pub const MAX_LEN_UNIT_STRING: usize = 32;

/// Number of raw sensor type codes (value of the producer's
/// `SENSOR_TYPE_MAX_SENSORS`). Sizes the per-type offset/count tables.
pub const SENSOR_TYPE_COUNT: usize = 26;

/// Size of the mapping the producer creates.
pub const MAPPING_SIZE: usize = 1024 * 1024;

/// Default name of the producer's shared memory segment.
#[cfg(windows)]
pub const DEFAULT_MAPPING_NAME: &str = "Global\\ARGUSMONITOR_DATA_INTERFACE";

/// Default name of the producer's shared memory segment.
#[cfg(not(windows))]
pub const DEFAULT_MAPPING_NAME: &str = "/ARGUSMONITOR_DATA_INTERFACE";

/// Default name of the mutex guarding the segment.
#[cfg(windows)]
pub const DEFAULT_MUTEX_NAME: &str = "Global\\ARGUSMONITOR_DATA_INTERFACE_MUTEX";

/// Default name of the mutex guarding the segment.
#[cfg(not(windows))]
pub const DEFAULT_MUTEX_NAME: &str = "/ARGUSMONITOR_DATA_INTERFACE_MUTEX";

/// Default bound on the wait for the segment mutex, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

/// Hardware categories the producer can report, in registry order.
pub const KNOWN_HARDWARE: [&str; 9] = [
    "CPU",
    "GPU",
    "RAM",
    "Fan",
    "Drive",
    "Network",
    "Battery",
    "Temperature",
    "ArgusMonitor",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_spells_argm() {
        assert_eq!(&ARGUS_SIGNATURE.to_le_bytes(), b"ArgM");
    }

    #[test]
    fn test_mutex_name_pairs_with_mapping_name() {
        assert!(DEFAULT_MUTEX_NAME.starts_with(DEFAULT_MAPPING_NAME));
        assert!(DEFAULT_MUTEX_NAME.ends_with("_MUTEX"));
    }

    #[test]
    fn test_capacities_are_consistent() {
        assert!(MAX_SENSOR_COUNT > 0);
        assert!(MAX_LEN_SENSOR_LABEL > MAX_LEN_UNIT_STRING);
        assert!(MAPPING_SIZE.is_power_of_two());
    }
}
