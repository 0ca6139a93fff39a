//! The `ArgusLink` facade
//!
//! Ties the connection, the enablement registry and the aggregator together
//! behind the small API hosts use: open, poll, close and toggle categories.

use crate::aggregate::{Aggregator, FnSink, PollOutcome, SensorRecord, SensorSink};
use crate::connection::{CloseStatus, Connection};
use crate::data::ProducerInfo;
use crate::error::{LinkError, LinkResult};
use crate::registry::HardwareRegistry;
use argus::config::LinkConfig;
use tracing::{debug, warn};

/// Reader of the producer's live sensor data.
///
/// Not internally synchronized: every mutating call takes `&mut self`. Hosts
/// that poll from one thread and toggle categories from another share it
/// behind a mutex, e.g. `Arc<parking_lot::Mutex<ArgusLink>>`.
///
/// ```rust,no_run
/// use argus_link::ArgusLink;
///
/// let mut link = ArgusLink::new();
/// if link.open().is_ok() {
///     link.set_hardware_enabled("Network", false);
///     link.poll(
///         |record| println!("{} = {:?}", record.id, record.value),
///         |id, value| println!("{id} = {value}"),
///     );
/// }
/// ```
pub struct ArgusLink {
    connection: Connection,
    registry: HardwareRegistry,
}

impl ArgusLink {
    /// Link with the default segment names and every category enabled.
    pub fn new() -> Self {
        Self::with_config(&LinkConfig::default())
    }

    /// Link with the names, lock timeout and category overrides of `config`.
    pub fn with_config(config: &LinkConfig) -> Self {
        Self {
            connection: Connection::new(config),
            registry: HardwareRegistry::with_overrides(&config.hardware),
        }
    }

    /// Connect to the producer. Succeeds without side effects when already
    /// open; see [`LinkError::status_code`] for the legacy failure codes.
    pub fn open(&mut self) -> LinkResult<()> {
        self.connection.open()
    }

    /// Disconnect. Idempotent.
    pub fn close(&mut self) -> CloseStatus {
        self.connection.close()
    }

    /// Whether the link is connected.
    pub fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    /// Whether the connected segment carries the producer's signature.
    pub fn check_signature(&self) -> bool {
        self.connection.check_signature()
    }

    /// Whether a live producer sits behind the connection.
    pub fn is_producer_present(&self) -> bool {
        self.connection.is_producer_present()
    }

    /// Number of valid sensor entries, 0 when unavailable.
    pub fn total_sensor_count(&self) -> u32 {
        self.producer_info()
            .map(|info| info.total_sensor_count)
            .unwrap_or(0)
    }

    /// Producer header, read under the lock.
    pub fn producer_info(&self) -> LinkResult<ProducerInfo> {
        self.connection.producer_info()
    }

    /// Enable or disable a hardware category by name.
    pub fn set_hardware_enabled(&mut self, name: &str, enabled: bool) {
        self.registry.set_enabled(name, enabled);
    }

    /// Whether a hardware category is enabled; `false` for unknown names.
    pub fn is_hardware_enabled(&self, name: &str) -> bool {
        self.registry.is_enabled(name)
    }

    /// The enablement registry.
    pub fn registry(&self) -> &HardwareRegistry {
        &self.registry
    }

    /// Cycle counter of the last delivered cycle.
    pub fn last_seen_cycle(&self) -> u32 {
        self.connection.last_seen_cycle()
    }

    /// Deliver the current cycle to `sink` if it is new.
    ///
    /// The segment mutex is held for the whole pass.
    pub fn try_poll(&mut self, sink: &mut dyn SensorSink) -> LinkResult<PollOutcome> {
        let Some(snapshot) = self.connection.next_cycle()? else {
            return Ok(PollOutcome::NoNewData);
        };

        let info = snapshot.producer_info();
        let outcome = Aggregator::new(&self.registry).process(&info, snapshot.sensors(), sink);
        Ok(outcome)
    }

    /// [`try_poll`](Self::try_poll) that reports only whether new data was
    /// delivered. Failures are logged.
    pub fn poll_into(&mut self, sink: &mut dyn SensorSink) -> bool {
        match self.try_poll(sink) {
            Ok(outcome) => outcome.has_new_data(),
            Err(LinkError::NotOpen) => false,
            Err(e @ LinkError::LockTimeout { .. }) => {
                warn!("poll skipped: {e}");
                false
            }
            Err(e) => {
                debug!("poll failed: {e}");
                false
            }
        }
    }

    /// Deliver the current cycle to a pair of callbacks if it is new.
    ///
    /// Returns `true` when a new cycle was delivered, `false` when nothing
    /// changed, the link is closed or the poll failed.
    pub fn poll<R, M>(&mut self, on_record: R, on_metric: M) -> bool
    where
        R: FnMut(&SensorRecord<'_>),
        M: FnMut(&str, f64),
    {
        self.poll_into(&mut FnSink::new(on_record, on_metric))
    }
}

impl Default for ArgusLink {
    fn default() -> Self {
        Self::new()
    }
}
