//! 64 KiB memory subsystem with a bank-switched high region.
//!
//! The address space is split into a common low region, always serviced by
//! the primary array (bank 0), and a banked high region that starts at
//! `bank_start` and is serviced by whichever bank `current_bank` selects.
//! Reads and writes are O(1) and never allocate; only [`Memory::initialize_banks`]
//! allocates.

use log::debug;

/// Default boundary where the banked region begins (48 KiB common / 16 KiB banked).
pub const DEFAULT_BANK_START: u16 = 0xC000;

/// 64 KiB addressable memory with optional bank switching above `bank_start`.
pub struct Memory {
    /// Primary 64 KiB array; always backs addresses below `bank_start` and
    /// backs the banked region itself when `current_bank == 0`.
    primary: Box<[u8; 0x10000]>,
    /// Additional banks, each `bank_size` bytes long. Index 0 is unused
    /// (bank 0 is always `primary`).
    banks: Vec<Vec<u8>>,
    /// Address at which the banked region begins.
    bank_start: u16,
    /// Currently selected bank (0 = primary).
    current_bank: usize,
    /// Inhibits writes to the banked region of bank 0 when set.
    write_protect: bool,
}

impl Memory {
    /// Bank size implied by the current `bank_start`.
    #[inline]
    fn bank_size(&self) -> usize {
        0x10000 - self.bank_start as usize
    }

    /// Create a fresh, zeroed 64 KiB memory with banking disabled.
    pub fn new() -> Self {
        Self {
            primary: Box::new([0u8; 0x10000]),
            banks: Vec::new(),
            bank_start: DEFAULT_BANK_START,
            current_bank: 0,
            write_protect: false,
        }
    }

    /// Read a byte. Total: every address in 0..=0xFFFF is valid.
    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        if self.current_bank == 0 || addr < self.bank_start {
            self.primary[addr as usize]
        } else {
            let bank = &self.banks[self.current_bank];
            bank[(addr - self.bank_start) as usize]
        }
    }

    /// Write a byte. Dropped silently if the target is the banked region of
    /// bank 0 and write-protect is asserted.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        if self.current_bank == 0 || addr < self.bank_start {
            if addr >= self.bank_start && self.current_bank == 0 && self.write_protect {
                return;
            }
            self.primary[addr as usize] = value;
        } else {
            let bank = &mut self.banks[self.current_bank];
            bank[(addr - self.bank_start) as usize] = value;
        }
    }

    /// Load a byte slice starting at `addr`, writing through bank 0 directly
    /// regardless of write-protect (this is a host-side bulk load, not an
    /// emulated CPU write).
    pub fn load(&mut self, addr: u16, bytes: &[u8]) -> Result<(), crate::error::LoadError> {
        let end = addr as usize + bytes.len();
        if end > 0x10000 {
            return Err(crate::error::LoadError::Overflow { addr, len: bytes.len() });
        }
        self.primary[addr as usize..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Allocate `n` banks. Bank 0 is always the primary array; banks
    /// `1..n` are zero-filled arrays of `bank_size()` bytes. `n <= 1`
    /// disables banking (and resets `current_bank` to 0).
    pub fn initialize_banks(&mut self, n: usize) {
        let size = self.bank_size();
        self.banks = (0..n.max(1)).map(|_| vec![0u8; size]).collect();
        if n <= 1 {
            self.current_bank = 0;
        } else if self.current_bank >= n {
            self.current_bank = 0;
        }
        debug!("memory: initialized {} bank(s) of {} bytes", n, size);
    }

    /// Select the active bank. Out-of-range values are ignored (no fault).
    pub fn select_bank(&mut self, bank: usize) {
        if bank < self.banks.len() {
            self.current_bank = bank;
        }
    }

    /// Currently selected bank index.
    pub fn current_bank(&self) -> usize {
        self.current_bank
    }

    /// Number of allocated banks (0 if banking was never initialized).
    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    /// Set the address at which the banked region begins, in units of
    /// 256-byte pages. Intended to be called before [`Memory::initialize_banks`];
    /// calling it afterward is accepted and only changes the stride used by
    /// the *next* `initialize_banks` call — existing bank buffers are left
    /// untouched.
    pub fn set_segment_size(&mut self, pages: u8) {
        self.bank_start = (pages as u16) << 8;
    }

    /// Current segment size in pages.
    pub fn segment_size_pages(&self) -> u8 {
        (self.bank_start >> 8) as u8
    }

    /// Enable or disable write-protect on the banked region of bank 0.
    pub fn set_write_protect(&mut self, protect: bool) {
        self.write_protect = protect;
    }

    /// Current write-protect state.
    pub fn write_protect(&self) -> bool {
        self.write_protect
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_read_write() {
        let mut mem = Memory::new();
        for addr in [0u16, 0x1234, 0x7FFF, 0xFFFF] {
            mem.write(addr, 0x42);
            assert_eq!(mem.read(addr), 0x42);
        }
    }

    #[test]
    fn load_round_trips_bytes() {
        let mut mem = Memory::new();
        let data: Vec<u8> = (0..=255u8).collect();
        mem.load(0x0100, &data).unwrap();
        for (i, &b) in data.iter().enumerate() {
            assert_eq!(mem.read(0x0100 + i as u16), b);
        }
    }

    #[test]
    fn load_rejects_overflow() {
        let mut mem = Memory::new();
        let data = vec![0u8; 16];
        assert!(mem.load(0xFFFE, &data).is_err());
    }

    #[test]
    fn bank_isolation() {
        let mut mem = Memory::new();
        mem.initialize_banks(2);
        mem.write(0xC000, 0xAA);
        mem.select_bank(1);
        mem.write(0xC000, 0x55);
        assert_eq!(mem.read(0xC000), 0x55);
        mem.select_bank(0);
        assert_eq!(mem.read(0xC000), 0xAA);
    }

    #[test]
    fn out_of_range_bank_select_is_ignored() {
        let mut mem = Memory::new();
        mem.initialize_banks(2);
        mem.select_bank(1);
        mem.select_bank(99);
        assert_eq!(mem.current_bank(), 1);
    }

    #[test]
    fn write_protect_blocks_banked_region_of_bank_zero() {
        let mut mem = Memory::new();
        mem.set_write_protect(true);
        mem.write(0xC000, 0xAA);
        assert_eq!(mem.read(0xC000), 0x00);
        mem.write(0x0000, 0xAA);
        assert_eq!(mem.read(0x0000), 0xAA, "common region is unaffected by write-protect");
    }

    #[test]
    fn common_region_unaffected_by_bank_selection() {
        let mut mem = Memory::new();
        mem.initialize_banks(2);
        mem.write(0x1000, 0x11);
        mem.select_bank(1);
        assert_eq!(mem.read(0x1000), 0x11);
    }

    #[test]
    fn n_le_1_disables_banking() {
        let mut mem = Memory::new();
        mem.initialize_banks(2);
        mem.select_bank(1);
        mem.initialize_banks(1);
        assert_eq!(mem.current_bank(), 0);
        assert_eq!(mem.bank_count(), 1);
    }
}
