//! Disk image provider boundary.
//!
//! The core does not know how a disk image is persisted — a real
//! implementation might back onto a file, a browser's local storage, or
//! plain memory. It only needs 128-byte sector read/write over a 77-track,
//! 26-sector-per-track geometry. [`DiskImageProvider`] is that boundary;
//! [`InMemoryDisk`] is the one concrete implementation the core ships,
//! used by its own tests and available to hosts with no filesystem.

use crate::error::DiskError;

/// Tracks per disk.
pub const TRACKS: usize = 77;
/// Sectors per track (1-based in the public API).
pub const SECTORS_PER_TRACK: usize = 26;
/// Bytes per sector.
pub const SECTOR_SIZE: usize = 128;
/// Total bytes in one logical disk image.
pub const DISK_SIZE: usize = TRACKS * SECTORS_PER_TRACK * SECTOR_SIZE;
/// Byte used to pad a short read past end-of-file (CP/M empty-sector convention).
pub const EMPTY_FILL: u8 = 0xE5;

/// Byte offset of a (track, 1-based sector) pair within a flat disk image.
pub fn sector_offset(track: u8, sector: u8) -> usize {
    track as usize * SECTORS_PER_TRACK * SECTOR_SIZE + (sector as usize - 1) * SECTOR_SIZE
}

/// A mountable source of 128-byte sectors, addressed by (drive, track, sector).
///
/// Sector numbers are 1-based. Implementations must not panic on any input;
/// invalid drive indices and I/O failures are reported through `DiskError`.
pub trait DiskImageProvider: Send {
    /// Whether a drive currently has an image mounted.
    fn is_mounted(&self, drive: u8) -> bool;

    /// Mount `data` on `drive`. `read_only` rejects subsequent writes.
    fn mount(&mut self, drive: u8, data: Vec<u8>, read_only: bool) -> Result<(), DiskError>;

    /// Unmount `drive`. Safe to call at any time, including while the CPU is running.
    fn unmount(&mut self, drive: u8);

    /// Whether `drive`'s mount rejects writes.
    fn is_read_only(&self, drive: u8) -> bool;

    /// Read one 128-byte sector into `buffer`. A short underlying image is
    /// padded with [`EMPTY_FILL`] and still reports success.
    fn read_sector(&self, drive: u8, track: u8, sector: u8, buffer: &mut [u8; SECTOR_SIZE]) -> Result<(), DiskError>;

    /// Write one 128-byte sector.
    fn write_sector(&mut self, drive: u8, track: u8, sector: u8, buffer: &[u8; SECTOR_SIZE]) -> Result<(), DiskError>;

    /// Re-read any cached mount state from the backing store. The in-memory
    /// provider has nothing to refresh; a file-backed host provider would
    /// re-stat/re-read here.
    fn refresh(&mut self, _drive: u8) -> Result<(), DiskError> {
        Ok(())
    }
}

struct Mount {
    data: Vec<u8>,
    read_only: bool,
}

/// A `DiskImageProvider` backed entirely by in-process byte buffers.
///
/// Useful for tests, for hosts without filesystem access, and as the
/// default when a caller already has the image bytes (e.g. received from a
/// browser's local storage or bundled as an asset).
pub struct InMemoryDisk {
    mounts: [Option<Mount>; 16],
}

impl InMemoryDisk {
    pub fn new() -> Self {
        Self { mounts: Default::default() }
    }

    fn mount_mut(&mut self, drive: u8) -> Result<&mut Mount, DiskError> {
        let slot = self.mounts.get_mut(drive as usize).ok_or(DiskError::InvalidDrive(drive))?;
        slot.as_mut().ok_or(DiskError::NotMounted(drive))
    }

    fn mount_ref(&self, drive: u8) -> Result<&Mount, DiskError> {
        let slot = self.mounts.get(drive as usize).ok_or(DiskError::InvalidDrive(drive))?;
        slot.as_ref().ok_or(DiskError::NotMounted(drive))
    }
}

impl Default for InMemoryDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskImageProvider for InMemoryDisk {
    fn is_mounted(&self, drive: u8) -> bool {
        self.mounts.get(drive as usize).map(|m| m.is_some()).unwrap_or(false)
    }

    fn mount(&mut self, drive: u8, data: Vec<u8>, read_only: bool) -> Result<(), DiskError> {
        let slot = self.mounts.get_mut(drive as usize).ok_or(DiskError::InvalidDrive(drive))?;
        *slot = Some(Mount { data, read_only });
        Ok(())
    }

    fn unmount(&mut self, drive: u8) {
        if let Some(slot) = self.mounts.get_mut(drive as usize) {
            *slot = None;
        }
    }

    fn is_read_only(&self, drive: u8) -> bool {
        self.mounts.get(drive as usize).and_then(|m| m.as_ref()).map(|m| m.read_only).unwrap_or(true)
    }

    fn read_sector(&self, drive: u8, track: u8, sector: u8, buffer: &mut [u8; SECTOR_SIZE]) -> Result<(), DiskError> {
        let mount = self.mount_ref(drive)?;
        let offset = sector_offset(track, sector);
        buffer.fill(EMPTY_FILL);
        if offset < mount.data.len() {
            let available = (mount.data.len() - offset).min(SECTOR_SIZE);
            buffer[..available].copy_from_slice(&mount.data[offset..offset + available]);
        }
        Ok(())
    }

    fn write_sector(&mut self, drive: u8, track: u8, sector: u8, buffer: &[u8; SECTOR_SIZE]) -> Result<(), DiskError> {
        let read_only = self.is_read_only(drive);
        let mount = self.mount_mut(drive)?;
        if read_only {
            return Err(DiskError::ReadOnly(drive));
        }
        let offset = sector_offset(track, sector);
        if mount.data.len() < offset + SECTOR_SIZE {
            mount.data.resize(offset + SECTOR_SIZE, EMPTY_FILL);
        }
        mount.data[offset..offset + SECTOR_SIZE].copy_from_slice(buffer);
        Ok(())
    }
}
