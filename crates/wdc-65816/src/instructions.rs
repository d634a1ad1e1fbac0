//! Instruction handlers.
//!
//! One function per opcode. Width-sensitive handlers go through the
//! `read`/`store`/`modify` drivers, which pick the width once and hand a
//! width-tagged [`Operand`] to the ALU operation.

use emu_core::{Bus, Fault};

use crate::Wdc65816;
use crate::addressing::{Mode, Operand};
use crate::flags::{C, D, I, N, V, Width, Z};

type Result<T> = std::result::Result<T, Fault>;

impl Wdc65816 {
    fn read_with(
        &mut self,
        bus: &mut dyn Bus,
        mode: Mode,
        base: u32,
        width: Width,
        op: fn(&mut Self, Operand),
    ) -> Result<u32> {
        let (operand, penalty) = if mode == Mode::Immediate {
            (self.fetch_operand(bus, width)?, 0)
        } else {
            let ea = self.effective_address(bus, mode)?;
            let operand = self.read_operand(bus, width, ea.address)?;
            (operand, ea.direct_penalty + ea.index_penalty)
        };
        op(self, operand);
        Ok(base + penalty + operand.extra_cycles())
    }

    /// Accumulator-width read through `mode`.
    fn read_acc(
        &mut self,
        bus: &mut dyn Bus,
        mode: Mode,
        base: u32,
        op: fn(&mut Self, Operand),
    ) -> Result<u32> {
        self.read_with(bus, mode, base, self.acc_width(), op)
    }

    /// Index-width read through `mode`.
    fn read_index(
        &mut self,
        bus: &mut dyn Bus,
        mode: Mode,
        base: u32,
        op: fn(&mut Self, Operand),
    ) -> Result<u32> {
        self.read_with(bus, mode, base, self.index_width(), op)
    }

    fn store(&mut self, bus: &mut dyn Bus, mode: Mode, base: u32, value: Operand) -> Result<u32> {
        let ea = self.effective_address(bus, mode)?;
        self.write_operand(bus, ea.address, value)?;
        Ok(base + ea.direct_penalty + value.extra_cycles())
    }

    /// Read-modify-write on memory. 16-bit operands cost two extra cycles.
    fn modify(
        &mut self,
        bus: &mut dyn Bus,
        mode: Mode,
        base: u32,
        op: fn(&mut Self, Operand) -> Operand,
    ) -> Result<u32> {
        let ea = self.effective_address(bus, mode)?;
        let operand = self.read_operand(bus, self.acc_width(), ea.address)?;
        let result = op(self, operand);
        self.write_operand(bus, ea.address, result)?;
        Ok(base + ea.direct_penalty + 2 * result.extra_cycles())
    }

    /// Read-modify-write on the accumulator.
    fn modify_acc(&mut self, op: fn(&mut Self, Operand) -> Operand) -> u32 {
        let operand = self.acc_operand();
        let result = op(self, operand);
        match result {
            Operand::Byte(value) => self.regs.set_a8(value),
            Operand::Word(value) => self.regs.a = value,
        }
        2
    }

    fn acc_operand(&self) -> Operand {
        match self.acc_width() {
            Width::Byte => Operand::Byte(self.regs.a8()),
            Width::Word => Operand::Word(self.regs.a),
        }
    }

    fn zero_operand(&self) -> Operand {
        match self.acc_width() {
            Width::Byte => Operand::Byte(0),
            Width::Word => Operand::Word(0),
        }
    }

    fn x_operand(&self) -> Operand {
        match self.index_width() {
            Width::Byte => Operand::Byte(self.regs.x8()),
            Width::Word => Operand::Word(self.regs.x),
        }
    }

    fn y_operand(&self) -> Operand {
        match self.index_width() {
            Width::Byte => Operand::Byte(self.regs.y8()),
            Width::Word => Operand::Word(self.regs.y),
        }
    }

    /// Conditional branch. The displacement is always consumed; taking the
    /// branch costs one cycle, crossing a page from the next-instruction PC
    /// costs another.
    fn branch(&mut self, bus: &mut dyn Bus, condition: bool) -> Result<u32> {
        let displacement = self.fetch8(bus)? as i8;
        if !condition {
            return Ok(2);
        }
        let from = self.regs.pc;
        let to = from.wrapping_add_signed(i16::from(displacement));
        self.regs.pc = to;
        Ok(3 + u32::from(from & 0xFF00 != to & 0xFF00))
    }
}

// ---------------------------------------------------------------------------
// Loads and stores
// ---------------------------------------------------------------------------

pub(crate) fn lda_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::lda)
}

pub(crate) fn lda_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::lda)
}

pub(crate) fn lda_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::lda)
}

pub(crate) fn lda_abs_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteX, 4, Wdc65816::lda)
}

pub(crate) fn lda_abs_y(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteY, 4, Wdc65816::lda)
}

pub(crate) fn lda_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLong, 5, Wdc65816::lda)
}

pub(crate) fn lda_long_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLongX, 5, Wdc65816::lda)
}

pub(crate) fn lda_dp_indirect(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::DirectIndirect, 5, Wdc65816::lda)
}

pub(crate) fn lda_dp_indirect_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::DirectIndirectLong, 6, Wdc65816::lda)
}

pub(crate) fn lda_dp_indirect_long_y(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::DirectIndirectLongY, 6, Wdc65816::lda)
}

pub(crate) fn ldx_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Immediate, 2, Wdc65816::ldx)
}

pub(crate) fn ldx_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Direct, 3, Wdc65816::ldx)
}

pub(crate) fn ldx_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Absolute, 4, Wdc65816::ldx)
}

pub(crate) fn ldy_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Immediate, 2, Wdc65816::ldy)
}

pub(crate) fn ldy_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Direct, 3, Wdc65816::ldy)
}

pub(crate) fn ldy_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Absolute, 4, Wdc65816::ldy)
}

pub(crate) fn sta_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Direct, 3, cpu.acc_operand())
}

pub(crate) fn sta_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Absolute, 4, cpu.acc_operand())
}

pub(crate) fn sta_abs_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::AbsoluteX, 5, cpu.acc_operand())
}

pub(crate) fn sta_abs_y(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::AbsoluteY, 5, cpu.acc_operand())
}

pub(crate) fn sta_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::AbsoluteLong, 5, cpu.acc_operand())
}

pub(crate) fn sta_long_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::AbsoluteLongX, 5, cpu.acc_operand())
}

pub(crate) fn sta_dp_indirect_long_y(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::DirectIndirectLongY, 6, cpu.acc_operand())
}

pub(crate) fn stx_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Direct, 3, cpu.x_operand())
}

pub(crate) fn stx_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Absolute, 4, cpu.x_operand())
}

pub(crate) fn sty_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Direct, 3, cpu.y_operand())
}

pub(crate) fn sty_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Absolute, 4, cpu.y_operand())
}

pub(crate) fn stz_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Direct, 3, cpu.zero_operand())
}

pub(crate) fn stz_dp_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::DirectX, 4, cpu.zero_operand())
}

pub(crate) fn stz_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::Absolute, 4, cpu.zero_operand())
}

pub(crate) fn stz_abs_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.store(bus, Mode::AbsoluteX, 5, cpu.zero_operand())
}

// ---------------------------------------------------------------------------
// Arithmetic and logic
// ---------------------------------------------------------------------------

pub(crate) fn adc_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::adc)
}

pub(crate) fn adc_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::adc)
}

pub(crate) fn adc_dp_indirect_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::DirectIndirectLong, 6, Wdc65816::adc)
}

pub(crate) fn adc_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::adc)
}

pub(crate) fn adc_abs_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteX, 4, Wdc65816::adc)
}

pub(crate) fn adc_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLong, 5, Wdc65816::adc)
}

pub(crate) fn adc_long_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLongX, 5, Wdc65816::adc)
}

pub(crate) fn sbc_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::sbc)
}

pub(crate) fn sbc_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::sbc)
}

pub(crate) fn sbc_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::sbc)
}

pub(crate) fn sbc_abs_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteX, 4, Wdc65816::sbc)
}

pub(crate) fn sbc_long_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLongX, 5, Wdc65816::sbc)
}

pub(crate) fn and_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::and)
}

pub(crate) fn and_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::and)
}

pub(crate) fn and_long_x(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::AbsoluteLongX, 5, Wdc65816::and)
}

pub(crate) fn ora_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::ora)
}

pub(crate) fn ora_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::ora)
}

pub(crate) fn ora_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::ora)
}

pub(crate) fn eor_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::eor)
}

pub(crate) fn eor_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::eor)
}

pub(crate) fn bit_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::bit_immediate)
}

pub(crate) fn bit_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::bit)
}

pub(crate) fn cmp_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Immediate, 2, Wdc65816::cmp)
}

pub(crate) fn cmp_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Direct, 3, Wdc65816::cmp)
}

pub(crate) fn cmp_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_acc(bus, Mode::Absolute, 4, Wdc65816::cmp)
}

pub(crate) fn cpx_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Immediate, 2, Wdc65816::cpx)
}

pub(crate) fn cpx_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Direct, 3, Wdc65816::cpx)
}

pub(crate) fn cpy_imm(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Immediate, 2, Wdc65816::cpy)
}

pub(crate) fn cpy_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.read_index(bus, Mode::Direct, 3, Wdc65816::cpy)
}

// ---------------------------------------------------------------------------
// Read-modify-write
// ---------------------------------------------------------------------------

pub(crate) fn tsb_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.modify(bus, Mode::Direct, 5, Wdc65816::tsb)
}

pub(crate) fn trb_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.modify(bus, Mode::Absolute, 6, Wdc65816::trb)
}

pub(crate) fn inc_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.modify(bus, Mode::Direct, 5, Wdc65816::inc)
}

pub(crate) fn inc_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.modify(bus, Mode::Absolute, 6, Wdc65816::inc)
}

pub(crate) fn dec_dp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.modify(bus, Mode::Direct, 5, Wdc65816::dec)
}

pub(crate) fn asl_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::asl))
}

pub(crate) fn lsr_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::lsr))
}

pub(crate) fn rol_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::rol))
}

pub(crate) fn ror_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::ror))
}

pub(crate) fn inc_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::inc))
}

pub(crate) fn dec_acc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(cpu.modify_acc(Wdc65816::dec))
}

pub(crate) fn inx(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.x8().wrapping_add(1);
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.x = cpu.regs.x.wrapping_add(1);
            cpu.regs.p.update_nz16(cpu.regs.x);
        }
    }
    Ok(2)
}

pub(crate) fn iny(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.y8().wrapping_add(1);
            cpu.regs.set_y8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.y = cpu.regs.y.wrapping_add(1);
            cpu.regs.p.update_nz16(cpu.regs.y);
        }
    }
    Ok(2)
}

pub(crate) fn dex(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.x8().wrapping_sub(1);
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.x = cpu.regs.x.wrapping_sub(1);
            cpu.regs.p.update_nz16(cpu.regs.x);
        }
    }
    Ok(2)
}

pub(crate) fn dey(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.y8().wrapping_sub(1);
            cpu.regs.set_y8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.y = cpu.regs.y.wrapping_sub(1);
            cpu.regs.p.update_nz16(cpu.regs.y);
        }
    }
    Ok(2)
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

pub(crate) fn bpl(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, !cpu.regs.p.is_set(N))
}

pub(crate) fn bmi(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, cpu.regs.p.is_set(N))
}

pub(crate) fn bvc(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, !cpu.regs.p.is_set(V))
}

pub(crate) fn bvs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, cpu.regs.p.is_set(V))
}

pub(crate) fn bcc(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, !cpu.regs.p.is_set(C))
}

pub(crate) fn bcs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, cpu.regs.p.is_set(C))
}

pub(crate) fn bne(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, !cpu.regs.p.is_set(Z))
}

pub(crate) fn beq(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, cpu.regs.p.is_set(Z))
}

pub(crate) fn bra(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.branch(bus, true)
}

pub(crate) fn brl(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let displacement = cpu.fetch16(bus)?;
    cpu.regs.pc = cpu.regs.pc.wrapping_add(displacement);
    Ok(4)
}

// ---------------------------------------------------------------------------
// Flags and mode control
// ---------------------------------------------------------------------------

pub(crate) fn clc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.clear(C);
    Ok(2)
}

pub(crate) fn sec(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.set(C);
    Ok(2)
}

pub(crate) fn cli(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.clear(I);
    Ok(2)
}

pub(crate) fn sei(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.set(I);
    Ok(2)
}

pub(crate) fn clv(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.clear(V);
    Ok(2)
}

pub(crate) fn cld(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.clear(D);
    Ok(2)
}

pub(crate) fn sed(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.p.set(D);
    Ok(2)
}

pub(crate) fn rep(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let mask = cpu.fetch8(bus)?;
    cpu.set_status(cpu.regs.p.0 & !mask);
    Ok(3)
}

pub(crate) fn sep(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let mask = cpu.fetch8(bus)?;
    cpu.set_status(cpu.regs.p.0 | mask);
    Ok(3)
}

/// Exchange carry and emulation. Software is expected to use this only to
/// leave emulation mode; staying in (or re-entering) it is fatal.
pub(crate) fn xce(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    let carry = cpu.regs.p.is_set(C);
    cpu.regs.p.set_if(C, cpu.regs.e);
    cpu.regs.e = carry;
    log::debug!("XCE: emulation={}", cpu.regs.e);
    if cpu.regs.e {
        return Err(Fault::Invariant(format!(
            "XCE left emulation mode active at ${:02X}:{:04X}",
            cpu.regs.pbr,
            cpu.regs.pc.wrapping_sub(1)
        )));
    }
    Ok(2)
}

pub(crate) fn nop(_cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    Ok(2)
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

pub(crate) fn tax(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.a8();
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.x = cpu.regs.a;
            cpu.regs.p.update_nz16(cpu.regs.x);
        }
    }
    Ok(2)
}

pub(crate) fn tay(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.a8();
            cpu.regs.set_y8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.y = cpu.regs.a;
            cpu.regs.p.update_nz16(cpu.regs.y);
        }
    }
    Ok(2)
}

pub(crate) fn txa(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.acc_width() {
        Width::Byte => {
            let value = cpu.regs.x8();
            cpu.regs.set_a8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.a = cpu.index_x();
            cpu.regs.p.update_nz16(cpu.regs.a);
        }
    }
    Ok(2)
}

pub(crate) fn tya(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.acc_width() {
        Width::Byte => {
            let value = cpu.regs.y8();
            cpu.regs.set_a8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.a = cpu.index_y();
            cpu.regs.p.update_nz16(cpu.regs.a);
        }
    }
    Ok(2)
}

pub(crate) fn txy(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.x8();
            cpu.regs.set_y8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.y = cpu.regs.x;
            cpu.regs.p.update_nz16(cpu.regs.y);
        }
    }
    Ok(2)
}

pub(crate) fn tyx(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.y8();
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.x = cpu.regs.y;
            cpu.regs.p.update_nz16(cpu.regs.x);
        }
    }
    Ok(2)
}

pub(crate) fn tsx(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.regs.sp as u8;
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
        }
        Width::Word => {
            cpu.regs.x = cpu.regs.sp;
            cpu.regs.p.update_nz16(cpu.regs.x);
        }
    }
    Ok(2)
}

pub(crate) fn txs(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.sp = if cpu.regs.e {
        0x0100 | u16::from(cpu.regs.x8())
    } else {
        cpu.index_x()
    };
    Ok(2)
}

pub(crate) fn tcs(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.sp = if cpu.regs.e {
        0x0100 | u16::from(cpu.regs.a8())
    } else {
        cpu.regs.a
    };
    Ok(2)
}

pub(crate) fn tsc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.a = cpu.regs.sp;
    cpu.regs.p.update_nz16(cpu.regs.a);
    Ok(2)
}

pub(crate) fn tcd(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.d = cpu.regs.a;
    cpu.regs.p.update_nz16(cpu.regs.d);
    Ok(2)
}

pub(crate) fn tdc(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.a = cpu.regs.d;
    cpu.regs.p.update_nz16(cpu.regs.a);
    Ok(2)
}

/// Swap the accumulator bytes. Flags come from the new low byte.
pub(crate) fn xba(cpu: &mut Wdc65816, _bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.a = cpu.regs.a.swap_bytes();
    cpu.regs.p.update_nz8(cpu.regs.a8());
    Ok(3)
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

pub(crate) fn pha(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.acc_width() {
        Width::Byte => {
            cpu.push8(bus, cpu.regs.a8())?;
            Ok(3)
        }
        Width::Word => {
            cpu.push16(bus, cpu.regs.a)?;
            Ok(4)
        }
    }
}

pub(crate) fn phx(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            cpu.push8(bus, cpu.regs.x8())?;
            Ok(3)
        }
        Width::Word => {
            cpu.push16(bus, cpu.regs.x)?;
            Ok(4)
        }
    }
}

pub(crate) fn phy(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            cpu.push8(bus, cpu.regs.y8())?;
            Ok(3)
        }
        Width::Word => {
            cpu.push16(bus, cpu.regs.y)?;
            Ok(4)
        }
    }
}

pub(crate) fn php(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.push8(bus, cpu.regs.p.0)?;
    Ok(3)
}

pub(crate) fn phb(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.push8(bus, cpu.regs.dbr)?;
    Ok(3)
}

pub(crate) fn phk(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.push8(bus, cpu.regs.pbr)?;
    Ok(3)
}

pub(crate) fn phd(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.push16(bus, cpu.regs.d)?;
    Ok(4)
}

pub(crate) fn pea(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let value = cpu.fetch16(bus)?;
    cpu.push16(bus, value)?;
    Ok(5)
}

pub(crate) fn pla(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.acc_width() {
        Width::Byte => {
            let value = cpu.pull8(bus)?;
            cpu.regs.set_a8(value);
            cpu.regs.p.update_nz8(value);
            Ok(4)
        }
        Width::Word => {
            cpu.regs.a = cpu.pull16(bus)?;
            cpu.regs.p.update_nz16(cpu.regs.a);
            Ok(5)
        }
    }
}

pub(crate) fn plx(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.pull8(bus)?;
            cpu.regs.set_x8(value);
            cpu.regs.p.update_nz8(value);
            Ok(4)
        }
        Width::Word => {
            cpu.regs.x = cpu.pull16(bus)?;
            cpu.regs.p.update_nz16(cpu.regs.x);
            Ok(5)
        }
    }
}

pub(crate) fn ply(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    match cpu.index_width() {
        Width::Byte => {
            let value = cpu.pull8(bus)?;
            cpu.regs.set_y8(value);
            cpu.regs.p.update_nz8(value);
            Ok(4)
        }
        Width::Word => {
            cpu.regs.y = cpu.pull16(bus)?;
            cpu.regs.p.update_nz16(cpu.regs.y);
            Ok(5)
        }
    }
}

pub(crate) fn plp(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let value = cpu.pull8(bus)?;
    cpu.set_status(value);
    Ok(4)
}

pub(crate) fn plb(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.dbr = cpu.pull8(bus)?;
    cpu.regs.p.update_nz8(cpu.regs.dbr);
    Ok(4)
}

pub(crate) fn pld(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.d = cpu.pull16(bus)?;
    cpu.regs.p.update_nz16(cpu.regs.d);
    Ok(5)
}

// ---------------------------------------------------------------------------
// Jumps, calls and returns
// ---------------------------------------------------------------------------

pub(crate) fn jmp_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.pc = cpu.fetch16(bus)?;
    Ok(3)
}

pub(crate) fn jmp_long(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.fetch24(bus)?;
    cpu.regs.pbr = (target >> 16) as u8;
    cpu.regs.pc = target as u16;
    Ok(4)
}

pub(crate) fn jmp_abs_indirect(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.effective_address(bus, Mode::AbsoluteIndirect)?;
    cpu.regs.pc = target.address as u16;
    Ok(5)
}

pub(crate) fn jmp_abs_indexed_indirect(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.effective_address(bus, Mode::AbsoluteIndexedIndirect)?;
    cpu.regs.pc = target.address as u16;
    Ok(6)
}

/// JSR pushes the address of its own last byte; RTS adds one back.
pub(crate) fn jsr_abs(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.fetch16(bus)?;
    cpu.push16(bus, cpu.regs.pc.wrapping_sub(1))?;
    cpu.regs.pc = target;
    Ok(6)
}

pub(crate) fn jsr_abs_indexed_indirect(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.effective_address(bus, Mode::AbsoluteIndexedIndirect)?;
    cpu.push16(bus, cpu.regs.pc.wrapping_sub(1))?;
    cpu.regs.pc = target.address as u16;
    Ok(8)
}

pub(crate) fn jsl(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let target = cpu.fetch24(bus)?;
    cpu.push8(bus, cpu.regs.pbr)?;
    cpu.push16(bus, cpu.regs.pc.wrapping_sub(1))?;
    cpu.regs.pbr = (target >> 16) as u8;
    cpu.regs.pc = target as u16;
    Ok(8)
}

pub(crate) fn rts(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.pc = cpu.pull16(bus)?.wrapping_add(1);
    Ok(6)
}

pub(crate) fn rtl(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    cpu.regs.pc = cpu.pull16(bus)?.wrapping_add(1);
    cpu.regs.pbr = cpu.pull8(bus)?;
    Ok(6)
}

/// Return from interrupt. Native mode also restores PBR.
pub(crate) fn rti(cpu: &mut Wdc65816, bus: &mut dyn Bus) -> Result<u32> {
    let status = cpu.pull8(bus)?;
    cpu.set_status(status);
    cpu.regs.pc = cpu.pull16(bus)?;
    // NMI entry always stacks PBR, so the return always unstacks it.
    cpu.regs.pbr = cpu.pull8(bus)?;
    Ok(if cpu.regs.e { 6 } else { 7 })
}
