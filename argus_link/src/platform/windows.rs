//! Win32 named file mapping and mutex primitives

use crate::error::{LinkError, LinkResult};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use windows_sys::Win32::Foundation::{
    CloseHandle, HANDLE, WAIT_ABANDONED, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile,
};
use windows_sys::Win32::System::Threading::{OpenMutexW, ReleaseMutex, WaitForSingleObject};

const READ_CONTROL: u32 = 0x0002_0000;
const SYNCHRONIZE: u32 = 0x0010_0000;
const MUTANT_QUERY_STATE: u32 = 0x0001;

fn wide(name: &str) -> Vec<u16> {
    name.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Open handle on the producer's file mapping.
pub struct MappingHandle {
    name: String,
    handle: Option<HANDLE>,
}

// SAFETY: kernel handles may be used from any thread.
unsafe impl Send for MappingHandle {}

impl MappingHandle {
    /// Open the existing named mapping read-only.
    pub fn open(name: &str) -> LinkResult<Self> {
        let wide_name = wide(name);
        // SAFETY: `wide_name` is NUL-terminated and outlives the call.
        let handle = unsafe { OpenFileMappingW(FILE_MAP_READ, 0, wide_name.as_ptr()) };
        if handle.is_null() {
            debug!(
                segment = name,
                "OpenFileMappingW failed: {}",
                std::io::Error::last_os_error()
            );
            return Err(LinkError::ProducerAbsent {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            handle: Some(handle),
        })
    }

    /// Map the first `len` bytes of the mapping read-only.
    pub fn map_view(&self, len: usize) -> LinkResult<MappedView> {
        let unavailable = |reason: String| LinkError::MappingUnavailable {
            name: self.name.clone(),
            reason,
        };
        let handle = self
            .handle
            .ok_or_else(|| unavailable("handle already closed".to_string()))?;

        // SAFETY: `handle` is a live file mapping handle.
        let view = unsafe { MapViewOfFile(handle, FILE_MAP_READ, 0, 0, len) };
        let ptr = NonNull::new(view.Value.cast::<u8>())
            .ok_or_else(|| unavailable(std::io::Error::last_os_error().to_string()))?;

        trace!(segment = %self.name, len, "view mapped");
        Ok(MappedView { ptr: Some(ptr) })
    }

    /// Close the handle. Safe to call more than once.
    pub fn close(&mut self) -> LinkResult<()> {
        if let Some(handle) = self.handle.take() {
            // SAFETY: `take` guarantees the handle is closed once.
            if unsafe { CloseHandle(handle) } == 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        Ok(())
    }
}

impl Drop for MappingHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(segment = %self.name, "closing mapping handle failed: {e}");
        }
    }
}

/// Read-only view of the mapping.
pub struct MappedView {
    ptr: Option<NonNull<u8>>,
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
            let address = MEMORY_MAPPED_VIEW_ADDRESS {
                Value: ptr.as_ptr().cast::<c_void>(),
            };
            // SAFETY: `address` is the base returned by `MapViewOfFile`.
            if unsafe { UnmapViewOfFile(address) } == 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        Ok(())
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            warn!("unmapping view failed: {e}");
        }
    }
}

/// The producer's named mutex.
pub struct NamedMutex {
    name: String,
    handle: Option<HANDLE>,
}

// SAFETY: kernel handles may be used from any thread.
unsafe impl Send for NamedMutex {}

impl NamedMutex {
    /// Open the producer's existing mutex.
    pub fn open(name: &str) -> LinkResult<Self> {
        let wide_name = wide(name);
        // SAFETY: `wide_name` is NUL-terminated and outlives the call.
        let handle = unsafe {
            OpenMutexW(
                READ_CONTROL | MUTANT_QUERY_STATE | SYNCHRONIZE,
                0,
                wide_name.as_ptr(),
            )
        };
        if handle.is_null() {
            debug!(
                mutex = name,
                "OpenMutexW failed: {}",
                std::io::Error::last_os_error()
            );
            return Err(LinkError::SynchronizationUnavailable {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            handle: Some(handle),
        })
    }

    /// Acquire the mutex, waiting at most `timeout`.
    ///
    /// An abandoned mutex (owner died while holding it) is acquired and
    /// logged; the data behind it is re-validated by the caller anyway.
    pub fn lock(&self, timeout: Duration) -> LinkResult<MutexGuard<'_>> {
        let handle = self.handle.ok_or(LinkError::NotOpen)?;
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX - 1);
        let start = Instant::now();

        // SAFETY: `handle` is a live mutex handle.
        let status = unsafe { WaitForSingleObject(handle, millis) };
        match status {
            WAIT_OBJECT_0 => Ok(MutexGuard {
                mutex: self,
                handle,
            }),
            WAIT_ABANDONED => {
                warn!(mutex = %self.name, "acquired abandoned mutex");
                Ok(MutexGuard {
                    mutex: self,
                    handle,
                })
            }
            WAIT_TIMEOUT => Err(LinkError::LockTimeout {
                name: self.name.clone(),
                waited_ms: start.elapsed().as_millis() as u64,
            }),
            _ => Err(std::io::Error::last_os_error().into()),
        }
    }

    /// Close the handle. Safe to call more than once.
    pub fn close(&mut self) -> LinkResult<()> {
        if let Some(handle) = self.handle.take() {
            // SAFETY: `take` guarantees the handle is closed once.
            if unsafe { CloseHandle(handle) } == 0 {
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

/// Held mutex; released on drop.
pub struct MutexGuard<'a> {
    mutex: &'a NamedMutex,
    handle: HANDLE,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: this thread owns the mutex while the guard exists.
        if unsafe { ReleaseMutex(self.handle) } == 0 {
            warn!(
                mutex = %self.mutex.name,
                "ReleaseMutex failed: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}
