//! The fixed set of I/O-port devices modeling a CP/M workstation.
//!
//! The device list is closed (the port map in the spec names exactly these
//! eight), so [`Devices`] holds each one as a concrete field rather than a
//! collection of trait objects — zero dispatch cost, and every device is
//! reachable by name for host control (mounting disks, enqueuing keyboard
//! input) without going through the port bus.

pub mod aux;
pub mod console;
pub mod control;
pub mod delay;
pub mod fdc;
pub mod mmu;
pub mod printer;
pub mod timer;

pub use aux::Aux;
pub use console::Console;
pub use control::Control;
pub use delay::Delay;
pub use fdc::{Fdc, FdcStatus};
pub use mmu::Mmu;
pub use printer::Printer;
pub use timer::Timer;

pub struct Devices {
    pub console: Console,
    pub printer: Printer,
    pub aux: Aux,
    pub fdc: Fdc,
    pub mmu: Mmu,
    pub timer: Timer,
    pub delay: Delay,
    pub control: Control,
}

impl Devices {
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            printer: Printer::new(),
            aux: Aux::new(),
            fdc: Fdc::new(),
            mmu: Mmu::new(),
            timer: Timer::new(),
            delay: Delay::new(),
            control: Control::new(),
        }
    }
}

impl Default for Devices {
    fn default() -> Self {
        Self::new()
    }
}
