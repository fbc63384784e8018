//! Programmed delay handler — port 28.
//!
//! Emulated software uses this to coarsely pace real-time loops. Blocking
//! the CPU thread for `n * 10 ms` is an explicit design decision (see the
//! concurrency model); tests disable it via `blocking` so a diagnostic run
//! is not slowed down by a busy guest program that hammers this port.

use std::time::Duration;

pub struct Delay {
    /// When true, `out_port` actually sleeps the calling thread.
    pub blocking: bool,
    /// Units of 10 ms requested by the most recent write, for inspection.
    pub last_units: u32,
}

impl Delay {
    pub fn new() -> Self {
        Self { blocking: true, last_units: 0 }
    }

    pub fn in_port(&self, port: u8) -> u8 {
        if port == 28 {
            0x00
        } else {
            0xFF
        }
    }

    pub fn out_port(&mut self, port: u8, value: u8) {
        if port == 28 && value > 0 {
            self.last_units = value as u32;
            if self.blocking {
                std::thread::sleep(Duration::from_millis(value as u64 * 10));
            }
        }
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_units_without_blocking_in_tests() {
        let mut d = Delay::new();
        d.blocking = false;
        d.out_port(28, 5);
        assert_eq!(d.last_units, 5);
        assert_eq!(d.in_port(28), 0);
    }

    #[test]
    fn zero_is_a_no_op() {
        let mut d = Delay::new();
        d.blocking = false;
        d.out_port(28, 0);
        assert_eq!(d.last_units, 0);
    }
}
