//! Platform-specific shared memory and mutex primitives
//!
//! Each platform module exposes the same four types:
//!
//! - `MappingHandle`: open handle on the producer's named segment
//! - `MappedView`: read-only view mapped from a handle
//! - `NamedMutex`: the producer's cross-process mutex
//! - `MutexGuard`: a held lock, released on drop
//!
//! Every type releases what it owns on drop and also offers an explicit
//! release that reports failure.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::{MappedView, MappingHandle, MutexGuard, NamedMutex};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{MappedView, MappingHandle, MutexGuard, NamedMutex};
