//! Connection to the producer's shared memory segment
//!
//! Opening acquires three resources in order (mapping handle, view, mutex
//! handle); a failure at any step drops whatever was acquired before it.
//! Reads of the live fields happen only through a [`SnapshotGuard`], which
//! borrows the view for exactly as long as the mutex is held.

use crate::data::{ProducerInfo, RawSnapshot};
use crate::error::{LinkError, LinkResult};
use crate::platform::{MappedView, MappingHandle, MutexGuard, NamedMutex};
use argus::config::LinkConfig;
use argus::consts::ARGUS_SIGNATURE;
use bitflags::bitflags;
use std::ops::Deref;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No resources held
    Closed,
    /// Acquiring mapping, view and mutex
    Opening,
    /// All resources held
    Open,
}

bitflags! {
    /// Sub-steps of [`Connection::close`] that failed.
    ///
    /// The connection ends up closed either way.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseStatus: u8 {
        /// Unmapping the view failed
        const UNMAP_FAILED = 0b01;
        /// Closing the mapping handle failed
        const HANDLE_CLOSE_FAILED = 0b10;
    }
}

impl CloseStatus {
    /// Legacy numeric form: 0 ok, 1 unmap failed, 10 handle close failed,
    /// 11 both.
    pub fn legacy_code(self) -> i32 {
        let mut code = 0;
        if self.contains(Self::UNMAP_FAILED) {
            code += 1;
        }
        if self.contains(Self::HANDLE_CLOSE_FAILED) {
            code += 10;
        }
        code
    }
}

struct Session {
    handle: MappingHandle,
    view: MappedView,
    mutex: NamedMutex,
}

impl Session {
    fn acquire(mapping_name: &str, mutex_name: &str) -> LinkResult<Self> {
        let handle = MappingHandle::open(mapping_name)?;
        let view = handle.map_view(RawSnapshot::SIZE)?;
        let mutex = NamedMutex::open(mutex_name)?;
        Ok(Self {
            handle,
            view,
            mutex,
        })
    }

    fn lock(&self, timeout: Duration) -> LinkResult<SnapshotGuard<'_>> {
        let ptr = self.view.as_ptr().ok_or(LinkError::NotOpen)?;
        let lock = self.mutex.lock(timeout)?;

        // SAFETY: the view is at least `RawSnapshot::SIZE` bytes (checked when
        // mapping), page-aligned, and every bit pattern is a valid
        // `RawSnapshot`. The producer only writes while holding the mutex,
        // which `lock` keeps for the lifetime of the reference.
        let snapshot = unsafe { ptr.cast::<RawSnapshot>().as_ref() };

        if !snapshot.has_valid_signature() {
            return Err(LinkError::InvalidSignature {
                found: snapshot.signature,
            });
        }

        Ok(SnapshotGuard {
            snapshot,
            _lock: lock,
        })
    }
}

/// Reader-side connection to the producer's segment.
///
/// Tracks the last cycle counter it handed out so that a cycle is delivered
/// at most once. Mutation goes through `&mut self`; sharing a connection
/// between threads needs an outer lock.
pub struct Connection {
    mapping_name: String,
    mutex_name: String,
    lock_timeout: Duration,
    state: ConnectionState,
    session: Option<Session>,
    last_seen_cycle: u32,
}

impl Connection {
    /// Closed connection for the names in `config`.
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            mapping_name: config.mapping_name.clone(),
            mutex_name: config.mutex_name.clone(),
            lock_timeout: config.lock_timeout(),
            state: ConnectionState::Closed,
            session: None,
            last_seen_cycle: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether all resources are held.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Cycle counter of the last delivered cycle, 0 before the first.
    pub fn last_seen_cycle(&self) -> u32 {
        self.last_seen_cycle
    }

    /// Open the segment, its view and its mutex.
    ///
    /// A no-op on an open connection. On failure the connection is closed
    /// again and every resource acquired so far has been released.
    pub fn open(&mut self) -> LinkResult<()> {
        if self.is_open() {
            return Ok(());
        }

        self.state = ConnectionState::Opening;
        match Session::acquire(&self.mapping_name, &self.mutex_name) {
            Ok(session) => {
                self.session = Some(session);
                self.last_seen_cycle = 0;
                self.state = ConnectionState::Open;
                info!(segment = %self.mapping_name, "connected to producer segment");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Closed;
                debug!(segment = %self.mapping_name, code = e.status_code(), "open failed: {e}");
                Err(e)
            }
        }
    }

    /// Release the view, the mapping handle and the mutex handle.
    ///
    /// Idempotent; always leaves the connection closed.
    pub fn close(&mut self) -> CloseStatus {
        self.state = ConnectionState::Closed;
        let Some(mut session) = self.session.take() else {
            return CloseStatus::empty();
        };

        let mut status = CloseStatus::empty();
        if let Err(e) = session.view.unmap() {
            warn!(segment = %self.mapping_name, "unmap failed: {e}");
            status |= CloseStatus::UNMAP_FAILED;
        }
        if let Err(e) = session.handle.close() {
            warn!(segment = %self.mapping_name, "closing mapping handle failed: {e}");
            status |= CloseStatus::HANDLE_CLOSE_FAILED;
        }
        if let Err(e) = session.mutex.close() {
            warn!(mutex = %self.mutex_name, "closing mutex handle failed: {e}");
        }

        debug!(segment = %self.mapping_name, code = status.legacy_code(), "connection closed");
        status
    }

    /// Whether the mapped segment carries the producer's signature.
    ///
    /// `false` when closed. Reads only the signature word, without the lock.
    pub fn check_signature(&self) -> bool {
        self.read_header_word(RawSnapshot::SIGNATURE_OFFSET) == Some(ARGUS_SIGNATURE)
    }

    /// Alias of [`check_signature`](Self::check_signature): a mapping
    /// without the signature is no producer at all.
    pub fn is_producer_present(&self) -> bool {
        self.check_signature()
    }

    /// Take the mutex and borrow the snapshot behind it.
    pub fn lock(&self) -> LinkResult<SnapshotGuard<'_>> {
        self.session
            .as_ref()
            .ok_or(LinkError::NotOpen)?
            .lock(self.lock_timeout)
    }

    /// Lock and return the snapshot only if its cycle was not delivered yet.
    ///
    /// The cycle is marked as seen before the caller processes it, so a
    /// failure halfway through never causes the same cycle to be redelivered.
    pub fn next_cycle(&mut self) -> LinkResult<Option<SnapshotGuard<'_>>> {
        let guard = self
            .session
            .as_ref()
            .ok_or(LinkError::NotOpen)?
            .lock(self.lock_timeout)?;

        let cycle = guard.cycle_counter;
        if cycle == self.last_seen_cycle {
            return Ok(None);
        }
        self.last_seen_cycle = cycle;
        Ok(Some(guard))
    }

    /// Producer header, read under the lock.
    pub fn producer_info(&self) -> LinkResult<ProducerInfo> {
        Ok(self.lock()?.producer_info())
    }

    fn read_header_word(&self, offset: usize) -> Option<u32> {
        let ptr = self.session.as_ref()?.view.as_ptr()?;
        // SAFETY: `offset` is a field offset inside the mapped header and the
        // view is page-aligned. Volatile because the producer may be writing.
        Some(unsafe { ptr.add(offset).cast::<u32>().as_ptr().read_volatile() })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Snapshot borrowed for as long as the segment mutex is held.
pub struct SnapshotGuard<'a> {
    snapshot: &'a RawSnapshot,
    _lock: MutexGuard<'a>,
}

impl Deref for SnapshotGuard<'_> {
    type Target = RawSnapshot;

    fn deref(&self) -> &RawSnapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_config() -> LinkConfig {
        LinkConfig {
            mapping_name: format!("/argus_conn_missing_{}", std::process::id()),
            mutex_name: format!("/argus_conn_missing_{}_MUTEX", std::process::id()),
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_close_status_legacy_codes() {
        assert_eq!(CloseStatus::empty().legacy_code(), 0);
        assert_eq!(CloseStatus::UNMAP_FAILED.legacy_code(), 1);
        assert_eq!(CloseStatus::HANDLE_CLOSE_FAILED.legacy_code(), 10);
        assert_eq!(CloseStatus::all().legacy_code(), 11);
    }

    #[test]
    fn test_new_connection_is_closed() {
        let connection = Connection::new(&missing_config());
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(!connection.is_open());
        assert!(!connection.check_signature());
        assert_eq!(connection.last_seen_cycle(), 0);
        assert!(matches!(connection.lock(), Err(LinkError::NotOpen)));
    }

    #[test]
    fn test_open_without_producer_rolls_back() {
        let mut connection = Connection::new(&missing_config());
        let err = connection.open().unwrap_err();
        assert_eq!(err.status_code(), 1);
        assert!(err.is_producer_absent());
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_close_never_opened_is_noop() {
        let mut connection = Connection::new(&missing_config());
        assert_eq!(connection.close(), CloseStatus::empty());
        assert_eq!(connection.close(), CloseStatus::empty());
        assert!(!connection.is_open());
    }

    #[test]
    fn test_next_cycle_requires_open() {
        let mut connection = Connection::new(&missing_config());
        assert!(matches!(connection.next_cycle(), Err(LinkError::NotOpen)));
    }
}
