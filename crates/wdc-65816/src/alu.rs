//! Arithmetic and logic operations.
//!
//! Each operation matches on the operand width and computes its 8-bit and
//! 16-bit results independently. Flags always come from the result at the
//! active width, so a stale high byte in A never affects N or Z.

use crate::Wdc65816;
use crate::addressing::Operand;
use crate::flags::{C, D, N, V, Z};

impl Wdc65816 {
    // -----------------------------------------------------------------------
    // Loads
    // -----------------------------------------------------------------------

    pub(crate) fn lda(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                self.regs.set_a8(value);
                self.regs.p.update_nz8(value);
            }
            Operand::Word(value) => {
                self.regs.a = value;
                self.regs.p.update_nz16(value);
            }
        }
    }

    pub(crate) fn ldx(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                self.regs.set_x8(value);
                self.regs.p.update_nz8(value);
            }
            Operand::Word(value) => {
                self.regs.x = value;
                self.regs.p.update_nz16(value);
            }
        }
    }

    pub(crate) fn ldy(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                self.regs.set_y8(value);
                self.regs.p.update_nz8(value);
            }
            Operand::Word(value) => {
                self.regs.y = value;
                self.regs.p.update_nz16(value);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Logic
    // -----------------------------------------------------------------------

    pub(crate) fn ora(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                let result = self.regs.a8() | value;
                self.regs.set_a8(result);
                self.regs.p.update_nz8(result);
            }
            Operand::Word(value) => {
                self.regs.a |= value;
                self.regs.p.update_nz16(self.regs.a);
            }
        }
    }

    pub(crate) fn and(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                let result = self.regs.a8() & value;
                self.regs.set_a8(result);
                self.regs.p.update_nz8(result);
            }
            Operand::Word(value) => {
                self.regs.a &= value;
                self.regs.p.update_nz16(self.regs.a);
            }
        }
    }

    pub(crate) fn eor(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                let result = self.regs.a8() ^ value;
                self.regs.set_a8(result);
                self.regs.p.update_nz8(result);
            }
            Operand::Word(value) => {
                self.regs.a ^= value;
                self.regs.p.update_nz16(self.regs.a);
            }
        }
    }

    /// BIT from memory: Z from A AND value, N and V from the operand's top
    /// two bits.
    pub(crate) fn bit(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                self.regs.p.set_if(Z, self.regs.a8() & value == 0);
                self.regs.p.set_if(N, value & 0x80 != 0);
                self.regs.p.set_if(V, value & 0x40 != 0);
            }
            Operand::Word(value) => {
                self.regs.p.set_if(Z, self.regs.a & value == 0);
                self.regs.p.set_if(N, value & 0x8000 != 0);
                self.regs.p.set_if(V, value & 0x4000 != 0);
            }
        }
    }

    /// BIT immediate only affects Z.
    pub(crate) fn bit_immediate(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => self.regs.p.set_if(Z, self.regs.a8() & value == 0),
            Operand::Word(value) => self.regs.p.set_if(Z, self.regs.a & value == 0),
        }
    }

    // -----------------------------------------------------------------------
    // Arithmetic
    // -----------------------------------------------------------------------

    pub(crate) fn adc(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => self.add8(value, false),
            Operand::Word(value) => self.add16(value, false),
        }
    }

    /// Subtract with borrow. Carry set means no borrow, in both widths.
    pub(crate) fn sbc(&mut self, operand: Operand) {
        match operand {
            Operand::Byte(value) => self.add8(!value, true),
            Operand::Word(value) => self.add16(!value, true),
        }
    }

    /// 8-bit add of `data` (already complemented for SBC) with carry in.
    fn add8(&mut self, data: u8, subtract: bool) {
        let a = i32::from(self.regs.a8());
        let b = i32::from(data);
        let carry = i32::from(self.regs.p.is_set(C));
        let decimal = self.regs.p.is_set(D);

        let mut result = if decimal {
            let mut low = (a & 0x0F) + (b & 0x0F) + carry;
            if subtract {
                if low <= 0x0F {
                    low -= 0x06;
                }
            } else if low > 0x09 {
                low += 0x06;
            }
            let half_carry = i32::from(low > 0x0F);
            (a & 0xF0) + (b & 0xF0) + (half_carry << 4) + (low & 0x0F)
        } else {
            a + b + carry
        };

        self.regs.p.set_if(V, (a ^ result) & (b ^ result) & 0x80 != 0);
        if decimal {
            if subtract {
                if result <= 0xFF {
                    result -= 0x60;
                }
            } else if result > 0x9F {
                result += 0x60;
            }
        }
        self.regs.p.set_if(C, result > 0xFF);

        let value = result as u8;
        self.regs.set_a8(value);
        self.regs.p.update_nz8(value);
    }

    /// 16-bit add of `data` (already complemented for SBC) with carry in.
    fn add16(&mut self, data: u16, subtract: bool) {
        let a = i32::from(self.regs.a);
        let b = i32::from(data);
        let carry = i32::from(self.regs.p.is_set(C));
        let decimal = self.regs.p.is_set(D);

        let mut result = if decimal {
            // Correct one BCD digit at a time, carrying into the next.
            let mut partial = 0;
            let mut digit_carry = carry;
            for shift in [0, 4, 8] {
                let digit = 0xF << shift;
                let below = (1 << shift) - 1;
                partial = (a & digit) + (b & digit) + (digit_carry << shift) + (partial & below);
                if subtract {
                    if partial <= (digit | below) {
                        partial -= 0x6 << shift;
                    }
                } else if partial > ((0x9 << shift) | below) {
                    partial += 0x6 << shift;
                }
                digit_carry = i32::from(partial > (digit | below));
            }
            (a & 0xF000) + (b & 0xF000) + (digit_carry << 12) + (partial & 0x0FFF)
        } else {
            a + b + carry
        };

        self.regs.p.set_if(V, (a ^ result) & (b ^ result) & 0x8000 != 0);
        if decimal {
            if subtract {
                if result <= 0xFFFF {
                    result -= 0x6000;
                }
            } else if result > 0x9FFF {
                result += 0x6000;
            }
        }
        self.regs.p.set_if(C, result > 0xFFFF);

        self.regs.a = result as u16;
        self.regs.p.update_nz16(self.regs.a);
    }

    /// Compare `register` (at the operand's width) with the operand. The
    /// register itself is never modified.
    pub(crate) fn compare(&mut self, register: u16, operand: Operand) {
        match operand {
            Operand::Byte(value) => {
                let register = register as u8;
                self.regs.p.set_if(C, register >= value);
                self.regs.p.update_nz8(register.wrapping_sub(value));
            }
            Operand::Word(value) => {
                self.regs.p.set_if(C, register >= value);
                self.regs.p.update_nz16(register.wrapping_sub(value));
            }
        }
    }

    pub(crate) fn cmp(&mut self, operand: Operand) {
        self.compare(self.regs.a, operand);
    }

    pub(crate) fn cpx(&mut self, operand: Operand) {
        self.compare(self.regs.x, operand);
    }

    pub(crate) fn cpy(&mut self, operand: Operand) {
        self.compare(self.regs.y, operand);
    }

    // -----------------------------------------------------------------------
    // Read-modify-write
    // -----------------------------------------------------------------------

    pub(crate) fn asl(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let result = value << 1;
                self.regs.p.set_if(C, value & 0x80 != 0);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = value << 1;
                self.regs.p.set_if(C, value & 0x8000 != 0);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    pub(crate) fn lsr(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let result = value >> 1;
                self.regs.p.set_if(C, value & 0x01 != 0);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = value >> 1;
                self.regs.p.set_if(C, value & 0x0001 != 0);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    pub(crate) fn rol(&mut self, operand: Operand) -> Operand {
        let carry_in = self.regs.p.is_set(C);
        match operand {
            Operand::Byte(value) => {
                let result = (value << 1) | u8::from(carry_in);
                self.regs.p.set_if(C, value & 0x80 != 0);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = (value << 1) | u16::from(carry_in);
                self.regs.p.set_if(C, value & 0x8000 != 0);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    pub(crate) fn ror(&mut self, operand: Operand) -> Operand {
        let carry_in = self.regs.p.is_set(C);
        match operand {
            Operand::Byte(value) => {
                let result = (value >> 1) | (u8::from(carry_in) << 7);
                self.regs.p.set_if(C, value & 0x01 != 0);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = (value >> 1) | (u16::from(carry_in) << 15);
                self.regs.p.set_if(C, value & 0x0001 != 0);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    pub(crate) fn inc(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let result = value.wrapping_add(1);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = value.wrapping_add(1);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    pub(crate) fn dec(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let result = value.wrapping_sub(1);
                self.regs.p.update_nz8(result);
                Operand::Byte(result)
            }
            Operand::Word(value) => {
                let result = value.wrapping_sub(1);
                self.regs.p.update_nz16(result);
                Operand::Word(result)
            }
        }
    }

    /// Test and set bits: Z from A AND value, then value |= A.
    pub(crate) fn tsb(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let a = self.regs.a8();
                self.regs.p.set_if(Z, value & a == 0);
                Operand::Byte(value | a)
            }
            Operand::Word(value) => {
                self.regs.p.set_if(Z, value & self.regs.a == 0);
                Operand::Word(value | self.regs.a)
            }
        }
    }

    /// Test and reset bits: Z from A AND value, then value &= !A.
    pub(crate) fn trb(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Byte(value) => {
                let a = self.regs.a8();
                self.regs.p.set_if(Z, value & a == 0);
                Operand::Byte(value & !a)
            }
            Operand::Word(value) => {
                self.regs.p.set_if(Z, value & self.regs.a == 0);
                Operand::Word(value & !self.regs.a)
            }
        }
    }
}
