//! 65816 processor status register (P).
//!
//! In native mode bits 4 and 5 select the index and accumulator widths. In
//! emulation mode both are held set.

/// Carry flag - set on unsigned carry out, or when no borrow occurred.
pub const C: u8 = 0x01;

/// Zero flag - set if the result at the active width is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode - enables BCD arithmetic for ADC/SBC.
pub const D: u8 = 0x08;

/// Index width - when set, X and Y are 8-bit.
pub const X: u8 = 0x10;

/// Memory/accumulator width - when set, A and memory operands are 8-bit.
pub const M: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if the top bit of the result is set.
pub const N: u8 = 0x80;

/// Operand width selected at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on a condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z from an 8-bit result.
    pub fn update_nz8(&mut self, value: u8) {
        self.set_if(Z, value == 0);
        self.set_if(N, value & 0x80 != 0);
    }

    /// Update N and Z from a 16-bit result.
    pub fn update_nz16(&mut self, value: u16) {
        self.set_if(Z, value == 0);
        self.set_if(N, value & 0x8000 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nz_uses_the_width_top_bit() {
        let mut p = Status::default();
        p.update_nz8(0x80);
        assert!(p.is_set(N));
        assert!(!p.is_set(Z));

        p.update_nz16(0x0080);
        assert!(!p.is_set(N));
        assert!(!p.is_set(Z));

        p.update_nz16(0x0000);
        assert!(p.is_set(Z));
    }
}
