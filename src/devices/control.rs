//! Hardware control register — port 160.
//!
//! Locked at construction; writing 0xAA unlocks it for the remainder of the
//! session. Once unlocked, bit 6 requests a reset and bit 7 requests a
//! halt. Rather than invoking stored callbacks, the device exposes
//! `take_pending_reset`/`take_pending_halt` for the run loop to poll at
//! instruction boundaries — matching the "synchronous events between
//! instruction boundaries" delivery model used elsewhere in the core.

const UNLOCK_KEY: u8 = 0xAA;
const BIT_RESET: u8 = 1 << 6;
const BIT_HALT: u8 = 1 << 7;

pub struct Control {
    unlocked: bool,
    pending_reset: bool,
    pending_halt: bool,
}

impl Control {
    pub fn new() -> Self {
        Self { unlocked: false, pending_reset: false, pending_halt: false }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn in_port(&self, port: u8) -> u8 {
        if port == 160 {
            self.unlocked as u8
        } else {
            0xFF
        }
    }

    pub fn out_port(&mut self, port: u8, value: u8) {
        if port != 160 {
            return;
        }
        if !self.unlocked {
            if value == UNLOCK_KEY {
                self.unlocked = true;
            }
            return;
        }
        if value & BIT_RESET != 0 {
            self.pending_reset = true;
        }
        if value & BIT_HALT != 0 {
            self.pending_halt = true;
        }
    }

    /// Take (and clear) the pending reset request.
    pub fn take_pending_reset(&mut self) -> bool {
        std::mem::take(&mut self.pending_reset)
    }

    /// Take (and clear) the pending halt request.
    pub fn take_pending_halt(&mut self) -> bool {
        std::mem::take(&mut self.pending_halt)
    }

    /// Reset clears the unlock and any pending request.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_writes_are_ignored_until_unlock_key() {
        let mut c = Control::new();
        c.out_port(160, BIT_RESET);
        assert!(!c.take_pending_reset());
        c.out_port(160, UNLOCK_KEY);
        assert!(c.is_unlocked());
        c.out_port(160, BIT_RESET);
        assert!(c.take_pending_reset());
        assert!(!c.take_pending_reset(), "take clears the flag");
    }

    #[test]
    fn halt_bit_is_independent_of_reset_bit() {
        let mut c = Control::new();
        c.out_port(160, UNLOCK_KEY);
        c.out_port(160, BIT_HALT);
        assert!(c.take_pending_halt());
        assert!(!c.take_pending_reset());
    }

    #[test]
    fn reset_relocks_the_register() {
        let mut c = Control::new();
        c.out_port(160, UNLOCK_KEY);
        c.reset();
        assert!(!c.is_unlocked());
    }
}
