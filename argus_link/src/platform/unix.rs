//! POSIX shared memory primitives
//!
//! The segment is a POSIX shm object opened with `shm_open`. The mutex is a
//! second shm object (the producer's `*_MUTEX` name) used purely as a lock
//! target for `flock`; whoever holds `LOCK_EX` on it owns the segment.

use crate::error::{LinkError, LinkResult};
use nix::fcntl::OFlag;
use nix::sys::mman::{MapFlags, ProtFlags, mmap, munmap, shm_open};
use nix::sys::stat::Mode;
use std::fs::File;
use std::num::NonZeroUsize;
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::ptr::NonNull;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Sleep between non-blocking lock attempts.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// Open handle on the producer's segment.
pub struct MappingHandle {
    name: String,
    file: Option<File>,
}

impl MappingHandle {
    /// Open an existing segment read-only.
    pub fn open(name: &str) -> LinkResult<Self> {
        let fd = shm_open(name, OFlag::O_RDONLY, Mode::empty()).map_err(|errno| {
            debug!(segment = name, %errno, "shm_open failed");
            LinkError::ProducerAbsent {
                name: name.to_string(),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            file: Some(File::from(fd)),
        })
    }

    /// Map the first `len` bytes of the segment read-only.
    pub fn map_view(&self, len: usize) -> LinkResult<MappedView> {
        let unavailable = |reason: String| LinkError::MappingUnavailable {
            name: self.name.clone(),
            reason,
        };

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| unavailable("handle already closed".to_string()))?;

        // Touching pages past the end of the object would raise SIGBUS.
        let size = file
            .metadata()
            .map_err(|e| unavailable(e.to_string()))?
            .len();
        if size < len as u64 {
            return Err(unavailable(format!(
                "segment holds {size} bytes, layout needs {len}"
            )));
        }

        let length =
            NonZeroUsize::new(len).ok_or_else(|| unavailable("empty view".to_string()))?;

        // SAFETY: a fresh shared read-only mapping of an fd we own; the
        // address is chosen by the kernel.
        let ptr = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ,
                MapFlags::MAP_SHARED,
                file,
                0,
            )
        }
        .map_err(|errno| unavailable(errno.to_string()))?;

        trace!(segment = %self.name, len, "view mapped");
        Ok(MappedView {
            ptr: Some(ptr.cast()),
            len,
        })
    }

    /// Close the descriptor. Safe to call more than once.
    pub fn close(&mut self) -> LinkResult<()> {
        if let Some(file) = self.file.take() {
            let fd = file.into_raw_fd();
            // SAFETY: `fd` came out of the `File` above and is closed once.
            if unsafe { libc::close(fd) } != 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        Ok(())
    }
}

impl Drop for MappingHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(segment = %self.name, "closing segment handle failed: {e}");
        }
    }
}

/// Read-only view of the segment.
pub struct MappedView {
    ptr: Option<NonNull<u8>>,
    len: usize,
}

// SAFETY: the view is a plain read-only mapping; the pointer is never shared
// outside the owning connection.
unsafe impl Send for MappedView {}

impl MappedView {
    /// Start of the view, `None` once unmapped.
    pub fn as_ptr(&self) -> Option<NonNull<u8>> {
        self.ptr
    }

    /// Unmap the view. Safe to call more than once.
    pub fn unmap(&mut self) -> LinkResult<()> {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: `ptr`/`len` describe the mapping created in `map_view`,
            // and `take` guarantees it is unmapped once.
            unsafe { munmap(ptr.cast(), self.len) }?;
        }
        Ok(())
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            warn!("unmapping segment view failed: {e}");
        }
    }
}

/// Cross-process mutex backed by `flock` on a named shm object.
pub struct NamedMutex {
    name: String,
    file: Option<File>,
}

impl NamedMutex {
    /// Open the producer's existing lock object.
    pub fn open(name: &str) -> LinkResult<Self> {
        let fd = shm_open(name, OFlag::O_RDONLY, Mode::empty()).map_err(|errno| {
            debug!(mutex = name, %errno, "lock object unavailable");
            LinkError::SynchronizationUnavailable {
                name: name.to_string(),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            file: Some(File::from(fd)),
        })
    }

    /// Acquire the mutex, waiting at most `timeout`.
    pub fn lock(&self, timeout: Duration) -> LinkResult<MutexGuard<'_>> {
        let fd = self
            .file
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or(LinkError::NotOpen)?;
        let start = Instant::now();

        loop {
            // SAFETY: `fd` stays open for as long as `self` is borrowed.
            if unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) } == 0 {
                return Ok(MutexGuard { mutex: self, fd });
            }

            let err = std::io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EWOULDBLOCK) | Some(libc::EINTR) => {}
                _ => return Err(err.into()),
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(LinkError::LockTimeout {
                    name: self.name.clone(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            std::thread::sleep(LOCK_RETRY_INTERVAL.min(timeout - waited));
        }
    }

    /// Close the descriptor. Safe to call more than once.
    pub fn close(&mut self) -> LinkResult<()> {
        if let Some(file) = self.file.take() {
            let fd = file.into_raw_fd();
            // SAFETY: `fd` came out of the `File` above and is closed once.
            if unsafe { libc::close(fd) } != 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        Ok(())
    }
}

impl Drop for NamedMutex {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(mutex = %self.name, "closing mutex handle failed: {e}");
        }
    }
}

/// Held lock; released on drop.
pub struct MutexGuard<'a> {
    mutex: &'a NamedMutex,
    fd: RawFd,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard borrows the mutex, so `fd` is still open.
        if unsafe { libc::flock(self.fd, libc::LOCK_UN) } != 0 {
            warn!(
                mutex = %self.mutex.name,
                "releasing lock failed: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}
