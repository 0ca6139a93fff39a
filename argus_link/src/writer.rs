//! Producer-side segment writer
//!
//! Creates a segment and its lock object with the producer's layout so the
//! reader can be exercised without the real producer running. It never fills
//! in data on the reader's behalf: a reader only ever sees what a writer
//! published.

use crate::data::{RawSensor, RawSnapshot};
use crate::error::{LinkError, LinkResult};
use argus::config::LinkConfig;
use argus::consts::{ARGUS_SIGNATURE, MAPPING_SIZE, MAX_SENSOR_COUNT, SENSOR_TYPE_COUNT};
use memmap2::{MmapMut, MmapOptions};
use nix::fcntl::OFlag;
use nix::sys::mman::{shm_open, shm_unlink};
use nix::sys::stat::Mode;
use std::fs::File;
use std::os::fd::AsRawFd;
use std::sync::atomic::{Ordering, fence};
use tracing::{debug, warn};

/// Owner of a producer-layout segment.
pub struct SnapshotWriter {
    mapping_name: String,
    mutex_name: Option<String>,
    mmap: MmapMut,
    lock_file: Option<File>,
}

impl SnapshotWriter {
    /// Create a full-size segment and its lock object under the names of
    /// `config`, with a valid signature and no sensors.
    pub fn create(config: &LinkConfig) -> LinkResult<Self> {
        Self::create_with(&config.mapping_name, Some(&config.mutex_name), MAPPING_SIZE)
    }

    /// Create a segment of `size` bytes, with or without a lock object.
    ///
    /// Segments smaller than the layout are left zeroed and only serve to
    /// exercise the reader's size check.
    pub fn create_with(mapping_name: &str, mutex_name: Option<&str>, size: usize) -> LinkResult<Self> {
        let segment = create_object(mapping_name)?;
        let mmap = match map_object(&segment, size) {
            Ok(mmap) => mmap,
            Err(e) => {
                let _ = shm_unlink(mapping_name);
                return Err(e);
            }
        };

        let lock_file = match mutex_name {
            Some(name) => match create_object(name) {
                Ok(file) => Some(file),
                Err(e) => {
                    let _ = shm_unlink(mapping_name);
                    return Err(e);
                }
            },
            None => None,
        };

        let mut writer = Self {
            mapping_name: mapping_name.to_string(),
            mutex_name: mutex_name.map(str::to_string),
            mmap,
            lock_file,
        };

        if let Some(snapshot) = writer.snapshot_mut() {
            snapshot.signature = ARGUS_SIGNATURE;
        }
        fence(Ordering::Release);

        debug!(segment = mapping_name, size, "writer segment created");
        Ok(writer)
    }

    /// Set the producer version header.
    pub fn set_version(
        &mut self,
        major: u8,
        minor_a: u8,
        minor_b: u8,
        build: u32,
        api_version: u32,
    ) -> LinkResult<()> {
        self.locked(|snapshot| {
            snapshot.argus_major = major;
            snapshot.argus_minor_a = minor_a;
            snapshot.argus_minor_b = minor_b;
            snapshot.argus_build = build;
            snapshot.version = api_version;
        })
    }

    /// Overwrite the signature word, e.g. to mimic a foreign mapping.
    pub fn set_signature(&mut self, signature: u32) -> LinkResult<()> {
        self.locked(|snapshot| snapshot.signature = signature)
    }

    /// Replace the sensor table and start a new cycle. Returns the new
    /// cycle counter.
    pub fn publish(&mut self, sensors: &[RawSensor]) -> LinkResult<u32> {
        self.locked(|snapshot| {
            let count = sensors.len().min(MAX_SENSOR_COUNT);
            snapshot.sensors[..count].copy_from_slice(&sensors[..count]);
            snapshot.sensors[count..].fill(RawSensor::EMPTY);
            snapshot.total_sensor_count = count as u32;
            fill_type_tables(snapshot, &sensors[..count]);
            snapshot.cycle_counter = snapshot.cycle_counter.wrapping_add(1);
            snapshot.cycle_counter
        })
    }

    /// Start a new cycle without touching the sensor table.
    pub fn bump_cycle(&mut self) -> LinkResult<u32> {
        self.locked(|snapshot| {
            snapshot.cycle_counter = snapshot.cycle_counter.wrapping_add(1);
            snapshot.cycle_counter
        })
    }

    /// Take the segment lock and keep it until the guard drops.
    pub fn hold_lock(&self) -> LinkResult<WriterLock<'_>> {
        let file = self.lock_file()?;
        flock(file, libc::LOCK_EX)?;
        Ok(WriterLock { file })
    }

    fn lock_file(&self) -> LinkResult<&File> {
        self.lock_file
            .as_ref()
            .ok_or_else(|| LinkError::SynchronizationUnavailable {
                name: self.mutex_name.clone().unwrap_or_default(),
            })
    }

    fn snapshot_mut(&mut self) -> Option<&mut RawSnapshot> {
        if self.mmap.len() < RawSnapshot::SIZE {
            return None;
        }
        // SAFETY: the mapping is page-aligned, large enough, exclusively
        // borrowed, and any bit pattern is a valid `RawSnapshot`.
        Some(unsafe { &mut *self.mmap.as_mut_ptr().cast::<RawSnapshot>() })
    }

    fn locked<T>(&mut self, f: impl FnOnce(&mut RawSnapshot) -> T) -> LinkResult<T> {
        let file = self.lock_file()?.try_clone()?;
        let name = self.mapping_name.clone();
        let snapshot = self.snapshot_mut().ok_or(LinkError::MappingUnavailable {
            name,
            reason: "segment smaller than the layout".to_string(),
        })?;

        flock(&file, libc::LOCK_EX)?;
        let out = f(snapshot);
        fence(Ordering::Release);
        flock(&file, libc::LOCK_UN)?;
        Ok(out)
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Err(e) = shm_unlink(self.mapping_name.as_str()) {
            warn!(segment = %self.mapping_name, "shm_unlink failed: {e}");
        }
        if let Some(name) = &self.mutex_name
            && let Err(e) = shm_unlink(name.as_str())
        {
            warn!(mutex = %name, "shm_unlink failed: {e}");
        }
    }
}

/// Segment lock held by a [`SnapshotWriter`].
pub struct WriterLock<'a> {
    file: &'a File,
}

impl Drop for WriterLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = flock(self.file, libc::LOCK_UN) {
            warn!("releasing writer lock failed: {e}");
        }
    }
}

fn create_object(name: &str) -> LinkResult<File> {
    let fd = shm_open(
        name,
        OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
        Mode::S_IRUSR | Mode::S_IWUSR,
    )?;
    Ok(File::from(fd))
}

fn map_object(file: &File, size: usize) -> LinkResult<MmapMut> {
    file.set_len(size as u64)?;
    // SAFETY: the object was just created exclusively by this writer.
    let mmap = unsafe { MmapOptions::new().len(size).map_mut(file)? };
    Ok(mmap)
}

fn flock(file: &File, operation: libc::c_int) -> LinkResult<()> {
    // SAFETY: `file` owns a valid descriptor for the duration of the call.
    if unsafe { libc::flock(file.as_raw_fd(), operation) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

/// Per-type first index and count, the way the producer indexes its table.
fn fill_type_tables(snapshot: &mut RawSnapshot, sensors: &[RawSensor]) {
    snapshot.offset_for_sensor_type = [0; SENSOR_TYPE_COUNT];
    snapshot.sensor_count = [0; SENSOR_TYPE_COUNT];
    for (index, sensor) in sensors.iter().enumerate() {
        let Some(slot) = usize::try_from(sensor.raw_code())
            .ok()
            .filter(|&code| code < SENSOR_TYPE_COUNT)
        else {
            continue;
        };
        if snapshot.sensor_count[slot] == 0 {
            snapshot.offset_for_sensor_type[slot] = index as u32;
        }
        snapshot.sensor_count[slot] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SensorTypeCode;
    use std::sync::atomic::AtomicU32;

    static NEXT: AtomicU32 = AtomicU32::new(0);

    fn names() -> (String, String) {
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let base = format!("/argus_writer_{}_{n}", std::process::id());
        (base.clone(), format!("{base}_MUTEX"))
    }

    #[test]
    fn test_publish_bumps_cycle_and_tables() {
        let (mapping, mutex) = names();
        let mut writer = SnapshotWriter::create_with(&mapping, Some(&mutex), MAPPING_SIZE).unwrap();

        let sensors = [
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 0", 40.0, 0, 0),
            RawSensor::new(SensorTypeCode::CpuTemperature, "Core 1", 41.0, 0, 1),
            RawSensor::new(SensorTypeCode::GpuLoad, "GPU", 12.0, 0, 0),
        ];
        assert_eq!(writer.publish(&sensors).unwrap(), 1);
        assert_eq!(writer.bump_cycle().unwrap(), 2);

        let snapshot = writer.snapshot_mut().unwrap();
        assert!(snapshot.has_valid_signature());
        assert_eq!(snapshot.total_sensor_count, 3);
        let cpu = SensorTypeCode::CpuTemperature.as_raw() as usize;
        let gpu = SensorTypeCode::GpuLoad.as_raw() as usize;
        assert_eq!(snapshot.sensor_count[cpu], 2);
        assert_eq!(snapshot.offset_for_sensor_type[gpu], 2);
        assert_eq!(snapshot.sensors()[1].label(), "Core 1");
    }

    #[test]
    fn test_duplicate_segment_rejected() {
        let (mapping, mutex) = names();
        let _first = SnapshotWriter::create_with(&mapping, Some(&mutex), MAPPING_SIZE).unwrap();
        assert!(SnapshotWriter::create_with(&mapping, None, MAPPING_SIZE).is_err());
    }

    #[test]
    fn test_small_segment_refuses_writes() {
        let (mapping, mutex) = names();
        let mut writer = SnapshotWriter::create_with(&mapping, Some(&mutex), 4096).unwrap();
        assert!(matches!(
            writer.publish(&[]),
            Err(LinkError::MappingUnavailable { .. })
        ));
    }

    #[test]
    fn test_lock_requires_mutex_object() {
        let (mapping, _) = names();
        let writer = SnapshotWriter::create_with(&mapping, None, MAPPING_SIZE).unwrap();
        assert!(matches!(
            writer.hold_lock(),
            Err(LinkError::SynchronizationUnavailable { .. })
        ));
    }
}
