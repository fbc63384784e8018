//! Typed errors surfaced across the core's external boundaries.
//!
//! Internal CPU, bus, and memory operations stay total (per the data model)
//! and never return `Result` — invalid port, bank, or FDC input is turned
//! into a status code or a silent no-op. These types cover the boundaries
//! that the host genuinely needs to react to: loading an image too large
//! for the address space, and disk image provider failures.

use thiserror::Error;

/// Failure loading a raw image (ROM, COM file, boot sector) into memory.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// The image does not fit in the 64 KiB address space starting at `addr`.
    #[error("image of {len} bytes at address {addr:#06x} overflows the 64 KiB address space")]
    Overflow { addr: u16, len: usize },
}

/// Failure reported by a [`crate::disk::DiskImageProvider`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiskError {
    /// The requested drive has no image mounted.
    #[error("drive {0} is not mounted")]
    NotMounted(u8),
    /// The drive index is outside the supported range (0..16).
    #[error("drive index {0} is out of range")]
    InvalidDrive(u8),
    /// A mount was attempted against an image that could not be read.
    #[error("failed to mount drive {drive}: {reason}")]
    MountFailed { drive: u8, reason: String },
    /// A write was attempted against a read-only mount.
    #[error("drive {0} is mounted read-only")]
    ReadOnly(u8),
    /// The underlying storage rejected the read.
    #[error("read failure on drive {0}")]
    ReadFailed(u8),
    /// The underlying storage rejected the write.
    #[error("write failure on drive {0}")]
    WriteFailed(u8),
}
