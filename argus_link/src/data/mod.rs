//! Producer data structures
//!
//! Layout of the Argus Monitor segment and the raw sensor type codes it uses.
//! Nothing in here interprets the data; classification lives in
//! [`crate::classify`].

pub mod layout;
pub mod sensor_type;

pub use layout::{ProducerInfo, RawSensor, RawSnapshot};
pub use sensor_type::SensorTypeCode;
