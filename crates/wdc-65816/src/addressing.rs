//! Instruction-stream fetches, stack access and addressing modes.
//!
//! Every helper consumes exactly the operand bytes its mode encodes, so `PC`
//! lands on the next opcode once the handler returns.

use emu_core::{Bus, Fault};

use crate::Wdc65816;
use crate::flags::Width;

/// Addressing mode of an instruction, as listed in the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    /// `dp`
    Direct,
    /// `dp,X`
    DirectX,
    /// `(dp)`
    DirectIndirect,
    /// `[dp]`
    DirectIndirectLong,
    /// `[dp],Y`
    DirectIndirectLongY,
    /// `abs`
    Absolute,
    /// `abs,X`
    AbsoluteX,
    /// `abs,Y`
    AbsoluteY,
    /// `long`
    AbsoluteLong,
    /// `long,X`
    AbsoluteLongX,
    /// `(abs)`
    AbsoluteIndirect,
    /// `(abs,X)`
    AbsoluteIndexedIndirect,
    Relative,
    RelativeLong,
}

/// A resolved data address plus the cycle penalties the mode incurred.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Effective {
    pub address: u32,
    /// One cycle when the low byte of D is non-zero.
    pub direct_penalty: u32,
    /// One cycle for a page crossing or a 16-bit index. Reads only.
    pub index_penalty: u32,
}

impl Effective {
    const fn plain(address: u32) -> Self {
        Self {
            address,
            direct_penalty: 0,
            index_penalty: 0,
        }
    }
}

/// A value read or written at the active width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Byte(u8),
    Word(u16),
}

impl Operand {
    /// Extra cycles a 16-bit operand costs over the 8-bit form.
    pub const fn extra_cycles(self) -> u32 {
        match self {
            Self::Byte(_) => 0,
            Self::Word(_) => 1,
        }
    }
}

const fn long(bank: u8, offset: u16) -> u32 {
    (bank as u32) << 16 | offset as u32
}

impl Wdc65816 {
    // -----------------------------------------------------------------------
    // Instruction stream
    // -----------------------------------------------------------------------

    pub(crate) fn fetch8(&mut self, bus: &mut dyn Bus) -> Result<u8, Fault> {
        let value = bus.read8(self.regs.program_counter())?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    pub(crate) fn fetch16(&mut self, bus: &mut dyn Bus) -> Result<u16, Fault> {
        let lo = self.fetch8(bus)?;
        let hi = self.fetch8(bus)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(crate) fn fetch24(&mut self, bus: &mut dyn Bus) -> Result<u32, Fault> {
        let offset = self.fetch16(bus)?;
        let bank = self.fetch8(bus)?;
        Ok(long(bank, offset))
    }

    /// Fetch an immediate operand at `width`.
    pub(crate) fn fetch_operand(
        &mut self,
        bus: &mut dyn Bus,
        width: Width,
    ) -> Result<Operand, Fault> {
        match width {
            Width::Byte => Ok(Operand::Byte(self.fetch8(bus)?)),
            Width::Word => Ok(Operand::Word(self.fetch16(bus)?)),
        }
    }

    // -----------------------------------------------------------------------
    // Data access
    // -----------------------------------------------------------------------

    pub(crate) fn read_operand(
        &mut self,
        bus: &mut dyn Bus,
        width: Width,
        address: u32,
    ) -> Result<Operand, Fault> {
        match width {
            Width::Byte => Ok(Operand::Byte(bus.read8(address)?)),
            Width::Word => Ok(Operand::Word(bus.read16(address)?)),
        }
    }

    pub(crate) fn write_operand(
        &mut self,
        bus: &mut dyn Bus,
        address: u32,
        value: Operand,
    ) -> Result<(), Fault> {
        match value {
            Operand::Byte(v) => bus.write8(address, v),
            Operand::Word(v) => bus.write16(address, v),
        }
    }

    // -----------------------------------------------------------------------
    // Stack
    // -----------------------------------------------------------------------

    fn stack_step(&self, sp: u16) -> u16 {
        if self.regs.e {
            0x0100 | (sp & 0x00FF)
        } else {
            sp
        }
    }

    pub(crate) fn push8(&mut self, bus: &mut dyn Bus, value: u8) -> Result<(), Fault> {
        bus.write8(u32::from(self.regs.sp), value)?;
        self.regs.sp = self.stack_step(self.regs.sp.wrapping_sub(1));
        Ok(())
    }

    /// Push a word: high byte first, so the low byte ends up at the lower
    /// address.
    pub(crate) fn push16(&mut self, bus: &mut dyn Bus, value: u16) -> Result<(), Fault> {
        let [lo, hi] = value.to_le_bytes();
        self.push8(bus, hi)?;
        self.push8(bus, lo)
    }

    pub(crate) fn pull8(&mut self, bus: &mut dyn Bus) -> Result<u8, Fault> {
        self.regs.sp = self.stack_step(self.regs.sp.wrapping_add(1));
        bus.read8(u32::from(self.regs.sp))
    }

    pub(crate) fn pull16(&mut self, bus: &mut dyn Bus) -> Result<u16, Fault> {
        let lo = self.pull8(bus)?;
        let hi = self.pull8(bus)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    // -----------------------------------------------------------------------
    // Addressing modes
    // -----------------------------------------------------------------------

    /// X as seen by the current index width.
    pub(crate) fn index_x(&self) -> u16 {
        match self.index_width() {
            Width::Byte => self.regs.x & 0x00FF,
            Width::Word => self.regs.x,
        }
    }

    /// Y as seen by the current index width.
    pub(crate) fn index_y(&self) -> u16 {
        match self.index_width() {
            Width::Byte => self.regs.y & 0x00FF,
            Width::Word => self.regs.y,
        }
    }

    fn direct_penalty(&self) -> u32 {
        u32::from(self.regs.d & 0x00FF != 0)
    }

    /// Direct-page pointer for the `dp` family: D plus the operand byte, in
    /// bank 0.
    fn direct_pointer(&mut self, bus: &mut dyn Bus) -> Result<u16, Fault> {
        let offset = self.fetch8(bus)?;
        Ok(self.regs.d.wrapping_add(u16::from(offset)))
    }

    fn indexed(&self, base: u32, index: u16) -> Effective {
        let address = base.wrapping_add(u32::from(index)) & 0x00FF_FFFF;
        let crossed = base & 0xFFFF_FF00 != address & 0xFFFF_FF00;
        Effective {
            address,
            direct_penalty: 0,
            index_penalty: u32::from(crossed || self.index_width() == Width::Word),
        }
    }

    /// Resolve the data address for `mode`, consuming its operand bytes.
    pub(crate) fn effective_address(
        &mut self,
        bus: &mut dyn Bus,
        mode: Mode,
    ) -> Result<Effective, Fault> {
        let effective = match mode {
            Mode::Direct => Effective {
                address: u32::from(self.direct_pointer(bus)?),
                direct_penalty: self.direct_penalty(),
                index_penalty: 0,
            },
            Mode::DirectX => {
                let pointer = self.direct_pointer(bus)?.wrapping_add(self.index_x());
                Effective {
                    address: u32::from(pointer),
                    direct_penalty: self.direct_penalty(),
                    index_penalty: 0,
                }
            }
            Mode::DirectIndirect => {
                let pointer = self.direct_pointer(bus)?;
                let offset = bus.read16(u32::from(pointer))?;
                Effective {
                    address: long(self.regs.dbr, offset),
                    direct_penalty: self.direct_penalty(),
                    index_penalty: 0,
                }
            }
            Mode::DirectIndirectLong | Mode::DirectIndirectLongY => {
                let pointer = self.direct_pointer(bus)?;
                let offset = bus.read16(u32::from(pointer))?;
                let bank = bus.read8(u32::from(pointer.wrapping_add(2)))?;
                let mut address = long(bank, offset);
                if mode == Mode::DirectIndirectLongY {
                    address = address.wrapping_add(u32::from(self.index_y())) & 0x00FF_FFFF;
                }
                Effective {
                    address,
                    direct_penalty: self.direct_penalty(),
                    index_penalty: 0,
                }
            }
            Mode::Absolute => Effective::plain(long(self.regs.dbr, self.fetch16(bus)?)),
            Mode::AbsoluteX => {
                let base = long(self.regs.dbr, self.fetch16(bus)?);
                self.indexed(base, self.index_x())
            }
            Mode::AbsoluteY => {
                let base = long(self.regs.dbr, self.fetch16(bus)?);
                self.indexed(base, self.index_y())
            }
            Mode::AbsoluteLong => Effective::plain(self.fetch24(bus)?),
            Mode::AbsoluteLongX => {
                let base = self.fetch24(bus)?;
                let address = base.wrapping_add(u32::from(self.index_x())) & 0x00FF_FFFF;
                Effective::plain(address)
            }
            Mode::AbsoluteIndirect => {
                let pointer = self.fetch16(bus)?;
                Effective::plain(u32::from(bus.read16(u32::from(pointer))?))
            }
            Mode::AbsoluteIndexedIndirect => {
                let pointer = self.fetch16(bus)?.wrapping_add(self.index_x());
                let target = bus.read16(long(self.regs.pbr, pointer))?;
                Effective::plain(long(self.regs.pbr, target))
            }
            Mode::Implied
            | Mode::Accumulator
            | Mode::Immediate
            | Mode::Relative
            | Mode::RelativeLong => {
                return Err(Fault::Invariant(format!(
                    "{mode:?} mode has no effective address"
                )));
            }
        };
        Ok(effective)
    }
}
