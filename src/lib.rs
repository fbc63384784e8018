//! Core emulation engine for a CP/M-2.2-compatible 8080/Z80 retro
//! workstation: two instruction-accurate CPU cores, a banked 64 KiB memory
//! subsystem, a 256-port I/O bus, the fixed device set a CP/M machine
//! exposes, an ADM-3A terminal, and the driver that ties them into a
//! runnable batched loop.
//!
//! Host applications (GUI shells, web front ends, headless test runners)
//! depend on this crate and supply their own [`disk::DiskImageProvider`]
//! and [`devices::printer::PrinterSink`] implementations where the default
//! in-memory ones are not enough.

pub mod bus;
pub mod cpu;
pub mod devices;
pub mod disk;
pub mod emu;
pub mod error;
pub mod harness;
pub mod memory;
pub mod terminal;

pub use bus::Bus;
pub use cpu::{Cpu, CpuType};
pub use emu::Emulator;
pub use error::{DiskError, LoadError};
pub use harness::CpmHarness;
pub use memory::Memory;
pub use terminal::Terminal;
