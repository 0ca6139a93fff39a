//! # Argus Monitor Link
//!
//! Reads the live sensor telemetry Argus Monitor publishes in a named shared
//! memory segment and republishes it to a host, filtered by hardware
//! category, through callbacks.
//!
//! The producer does all measuring. This crate opens its segment read-only,
//! watches the cycle counter, classifies each raw entry into a
//! `(hardware, sensor type, group)` triple, normalizes units and derives
//! per-core CPU aggregates.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────┐   ┌──────────┐
//! │ Argus Monitor├──►│ segment + mutex  ├──►│ Connection ├──►│Aggregator├──► SensorSink
//! │  (producer)  │   │ [header|sensors] │   │  (locked)  │   │ classify │    (host)
//! └──────────────┘   └──────────────────┘   └────────────┘   └──────────┘
//!                                                                 ▲
//!                                                     HardwareRegistry
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use argus_link::{ArgusLink, CollectingSink, PollOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut link = ArgusLink::new();
//! link.open()?;
//!
//! let mut sink = CollectingSink::new();
//! if let PollOutcome::Processed { records, metrics } = link.try_poll(&mut sink)? {
//!     println!("{records} records, {metrics} metrics");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Every call that mutates state takes `&mut self`, and the segment mutex is
//! held for the whole of a poll. The link never spawns threads.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod classify;
pub mod connection;
pub mod data;
pub mod error;
pub mod link;
pub mod platform;
pub mod registry;
#[cfg(unix)]
pub mod writer;

pub use aggregate::{
    Aggregator, CollectingSink, FnSink, OwnedRecord, OwnedValue, PollOutcome, SensorRecord,
    SensorSink, SensorValue,
};
pub use classify::{Classification, HardwareType, SensorType, classify, normalize, sensor_id};
pub use connection::{CloseStatus, Connection, ConnectionState, SnapshotGuard};
pub use data::{ProducerInfo, RawSensor, RawSnapshot, SensorTypeCode};
pub use error::{LinkError, LinkResult};
pub use link::ArgusLink;
pub use registry::HardwareRegistry;
#[cfg(unix)]
pub use writer::SnapshotWriter;

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
