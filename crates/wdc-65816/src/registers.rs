//! 65816 CPU registers.

use std::fmt;

use crate::Status;
use crate::flags::{C, D, I, M, N, V, X, Z};

/// 65816 CPU register set.
///
/// A, X and Y are always stored as 16 bits. When a register is operating at
/// 8 bits only the low byte is read or written and the high byte keeps
/// whatever it held before (for A this is the hidden "B" byte that XBA
/// swaps in).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator (C = B:A).
    pub a: u16,
    /// X index register.
    pub x: u16,
    /// Y index register.
    pub y: u16,
    /// Stack pointer. The stack lives in bank 0.
    pub sp: u16,
    /// Direct page base.
    pub d: u16,
    /// Program counter within the program bank.
    pub pc: u16,
    /// Program bank.
    pub pbr: u8,
    /// Data bank.
    pub dbr: u8,
    /// Processor status flags.
    pub p: Status,
    /// Emulation mode latch.
    pub e: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in reset state: emulation mode, 8-bit widths, IRQs
    /// disabled, stack at $01FF.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0x01FF,
            d: 0,
            pc: 0,
            pbr: 0,
            dbr: 0,
            p: Status(M | X | I),
            e: true,
        }
    }

    #[must_use]
    pub const fn a8(&self) -> u8 {
        self.a as u8
    }

    pub fn set_a8(&mut self, value: u8) {
        self.a = (self.a & 0xFF00) | u16::from(value);
    }

    /// The hidden high byte of the accumulator.
    #[must_use]
    pub const fn b(&self) -> u8 {
        (self.a >> 8) as u8
    }

    #[must_use]
    pub const fn x8(&self) -> u8 {
        self.x as u8
    }

    pub fn set_x8(&mut self, value: u8) {
        self.x = (self.x & 0xFF00) | u16::from(value);
    }

    #[must_use]
    pub const fn y8(&self) -> u8 {
        self.y as u8
    }

    pub fn set_y8(&mut self, value: u8) {
        self.y = (self.y & 0xFF00) | u16::from(value);
    }

    /// Full 24-bit program counter.
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        (self.pbr as u32) << 16 | self.pc as u32
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bit: u8, set: char, clear: char| {
            if self.p.is_set(bit) { set } else { clear }
        };
        write!(
            f,
            "A:{:04X} X:{:04X} Y:{:04X} S:{:04X} D:{:04X} DB:{:02X} {}{}{}{}{}{}{}{} {}",
            self.a,
            self.x,
            self.y,
            self.sp,
            self.d,
            self.dbr,
            flag(N, 'N', 'n'),
            flag(V, 'V', 'v'),
            flag(M, 'M', 'm'),
            flag(X, 'X', 'x'),
            flag(D, 'D', 'd'),
            flag(I, 'I', 'i'),
            flag(Z, 'Z', 'z'),
            flag(C, 'C', 'c'),
            if self.e { 'E' } else { 'e' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_views_keep_the_high_byte() {
        let mut regs = Registers::new();
        regs.a = 0x12FF;
        regs.set_a8(0x34);
        assert_eq!(regs.a, 0x1234);
        assert_eq!(regs.b(), 0x12);

        regs.x = 0xAB00;
        regs.set_x8(0x01);
        assert_eq!(regs.x, 0xAB01);
    }

    #[test]
    fn display_shows_flags() {
        let regs = Registers::new();
        assert_eq!(
            regs.to_string(),
            "A:0000 X:0000 Y:0000 S:01FF D:0000 DB:00 nvMXdIzc E"
        );
    }
}
