//! Opcode dispatch table.
//!
//! A fixed 256-entry table indexed by opcode byte. Empty slots are opcodes
//! this core does not implement; fetching one is a fault.

use std::fmt;

use emu_core::{Bus, Fault};

use crate::Wdc65816;
use crate::addressing::Mode;
use crate::instructions as ins;

pub(crate) type Handler = fn(&mut Wdc65816, &mut dyn Bus) -> Result<u32, Fault>;

/// One entry of the dispatch table.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub mode: Mode,
    pub(crate) exec: Handler,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("mnemonic", &self.mnemonic)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Look up the table entry for an opcode byte.
#[must_use]
pub fn opcode(code: u8) -> Option<Instruction> {
    OPCODES[usize::from(code)]
}

static OPCODES: [Option<Instruction>; 256] = build_table();

const fn op(mnemonic: &'static str, mode: Mode, exec: Handler) -> Option<Instruction> {
    Some(Instruction {
        mnemonic,
        mode,
        exec,
    })
}

const fn build_table() -> [Option<Instruction>; 256] {
    use Mode::{
        Absolute, AbsoluteIndexedIndirect, AbsoluteIndirect, AbsoluteLong, AbsoluteLongX,
        AbsoluteX, AbsoluteY, Accumulator, Direct, DirectIndirect, DirectIndirectLong,
        DirectIndirectLongY, DirectX, Immediate, Implied, Relative, RelativeLong,
    };

    let mut t: [Option<Instruction>; 256] = [None; 256];

    t[0x04] = op("TSB", Direct, ins::tsb_dp);
    t[0x05] = op("ORA", Direct, ins::ora_dp);
    t[0x08] = op("PHP", Implied, ins::php);
    t[0x09] = op("ORA", Immediate, ins::ora_imm);
    t[0x0A] = op("ASL", Accumulator, ins::asl_acc);
    t[0x0B] = op("PHD", Implied, ins::phd);
    t[0x0D] = op("ORA", Absolute, ins::ora_abs);

    t[0x10] = op("BPL", Relative, ins::bpl);
    t[0x18] = op("CLC", Implied, ins::clc);
    t[0x1A] = op("INC", Accumulator, ins::inc_acc);
    t[0x1B] = op("TCS", Implied, ins::tcs);
    t[0x1C] = op("TRB", Absolute, ins::trb_abs);

    t[0x20] = op("JSR", Absolute, ins::jsr_abs);
    t[0x22] = op("JSL", AbsoluteLong, ins::jsl);
    t[0x28] = op("PLP", Implied, ins::plp);
    t[0x29] = op("AND", Immediate, ins::and_imm);
    t[0x2A] = op("ROL", Accumulator, ins::rol_acc);
    t[0x2B] = op("PLD", Implied, ins::pld);
    t[0x2C] = op("BIT", Absolute, ins::bit_abs);
    t[0x2D] = op("AND", Absolute, ins::and_abs);

    t[0x30] = op("BMI", Relative, ins::bmi);
    t[0x38] = op("SEC", Implied, ins::sec);
    t[0x3A] = op("DEC", Accumulator, ins::dec_acc);
    t[0x3B] = op("TSC", Implied, ins::tsc);
    t[0x3F] = op("AND", AbsoluteLongX, ins::and_long_x);

    t[0x40] = op("RTI", Implied, ins::rti);
    t[0x45] = op("EOR", Direct, ins::eor_dp);
    t[0x48] = op("PHA", Implied, ins::pha);
    t[0x49] = op("EOR", Immediate, ins::eor_imm);
    t[0x4A] = op("LSR", Accumulator, ins::lsr_acc);
    t[0x4B] = op("PHK", Implied, ins::phk);
    t[0x4C] = op("JMP", Absolute, ins::jmp_abs);

    t[0x50] = op("BVC", Relative, ins::bvc);
    t[0x58] = op("CLI", Implied, ins::cli);
    t[0x5A] = op("PHY", Implied, ins::phy);
    t[0x5B] = op("TCD", Implied, ins::tcd);
    t[0x5C] = op("JML", AbsoluteLong, ins::jmp_long);

    t[0x60] = op("RTS", Implied, ins::rts);
    t[0x64] = op("STZ", Direct, ins::stz_dp);
    t[0x65] = op("ADC", Direct, ins::adc_dp);
    t[0x67] = op("ADC", DirectIndirectLong, ins::adc_dp_indirect_long);
    t[0x68] = op("PLA", Implied, ins::pla);
    t[0x69] = op("ADC", Immediate, ins::adc_imm);
    t[0x6A] = op("ROR", Accumulator, ins::ror_acc);
    t[0x6B] = op("RTL", Implied, ins::rtl);
    t[0x6C] = op("JMP", AbsoluteIndirect, ins::jmp_abs_indirect);
    t[0x6D] = op("ADC", Absolute, ins::adc_abs);
    t[0x6F] = op("ADC", AbsoluteLong, ins::adc_long);

    t[0x70] = op("BVS", Relative, ins::bvs);
    t[0x74] = op("STZ", DirectX, ins::stz_dp_x);
    t[0x78] = op("SEI", Implied, ins::sei);
    t[0x7A] = op("PLY", Implied, ins::ply);
    t[0x7B] = op("TDC", Implied, ins::tdc);
    t[0x7C] = op("JMP", AbsoluteIndexedIndirect, ins::jmp_abs_indexed_indirect);
    t[0x7D] = op("ADC", AbsoluteX, ins::adc_abs_x);
    t[0x7F] = op("ADC", AbsoluteLongX, ins::adc_long_x);

    t[0x80] = op("BRA", Relative, ins::bra);
    t[0x82] = op("BRL", RelativeLong, ins::brl);
    t[0x84] = op("STY", Direct, ins::sty_dp);
    t[0x85] = op("STA", Direct, ins::sta_dp);
    t[0x86] = op("STX", Direct, ins::stx_dp);
    t[0x88] = op("DEY", Implied, ins::dey);
    t[0x89] = op("BIT", Immediate, ins::bit_imm);
    t[0x8A] = op("TXA", Implied, ins::txa);
    t[0x8B] = op("PHB", Implied, ins::phb);
    t[0x8C] = op("STY", Absolute, ins::sty_abs);
    t[0x8D] = op("STA", Absolute, ins::sta_abs);
    t[0x8E] = op("STX", Absolute, ins::stx_abs);
    t[0x8F] = op("STA", AbsoluteLong, ins::sta_long);

    t[0x90] = op("BCC", Relative, ins::bcc);
    t[0x97] = op("STA", DirectIndirectLongY, ins::sta_dp_indirect_long_y);
    t[0x98] = op("TYA", Implied, ins::tya);
    t[0x99] = op("STA", AbsoluteY, ins::sta_abs_y);
    t[0x9A] = op("TXS", Implied, ins::txs);
    t[0x9B] = op("TXY", Implied, ins::txy);
    t[0x9C] = op("STZ", Absolute, ins::stz_abs);
    t[0x9D] = op("STA", AbsoluteX, ins::sta_abs_x);
    t[0x9E] = op("STZ", AbsoluteX, ins::stz_abs_x);
    t[0x9F] = op("STA", AbsoluteLongX, ins::sta_long_x);

    t[0xA0] = op("LDY", Immediate, ins::ldy_imm);
    t[0xA2] = op("LDX", Immediate, ins::ldx_imm);
    t[0xA4] = op("LDY", Direct, ins::ldy_dp);
    t[0xA5] = op("LDA", Direct, ins::lda_dp);
    t[0xA6] = op("LDX", Direct, ins::ldx_dp);
    t[0xA7] = op("LDA", DirectIndirectLong, ins::lda_dp_indirect_long);
    t[0xA8] = op("TAY", Implied, ins::tay);
    t[0xA9] = op("LDA", Immediate, ins::lda_imm);
    t[0xAA] = op("TAX", Implied, ins::tax);
    t[0xAB] = op("PLB", Implied, ins::plb);
    t[0xAC] = op("LDY", Absolute, ins::ldy_abs);
    t[0xAD] = op("LDA", Absolute, ins::lda_abs);
    t[0xAE] = op("LDX", Absolute, ins::ldx_abs);
    t[0xAF] = op("LDA", AbsoluteLong, ins::lda_long);

    t[0xB0] = op("BCS", Relative, ins::bcs);
    t[0xB2] = op("LDA", DirectIndirect, ins::lda_dp_indirect);
    t[0xB7] = op("LDA", DirectIndirectLongY, ins::lda_dp_indirect_long_y);
    t[0xB8] = op("CLV", Implied, ins::clv);
    t[0xB9] = op("LDA", AbsoluteY, ins::lda_abs_y);
    t[0xBA] = op("TSX", Implied, ins::tsx);
    t[0xBB] = op("TYX", Implied, ins::tyx);
    t[0xBD] = op("LDA", AbsoluteX, ins::lda_abs_x);
    t[0xBF] = op("LDA", AbsoluteLongX, ins::lda_long_x);

    t[0xC0] = op("CPY", Immediate, ins::cpy_imm);
    t[0xC2] = op("REP", Immediate, ins::rep);
    t[0xC4] = op("CPY", Direct, ins::cpy_dp);
    t[0xC5] = op("CMP", Direct, ins::cmp_dp);
    t[0xC6] = op("DEC", Direct, ins::dec_dp);
    t[0xC8] = op("INY", Implied, ins::iny);
    t[0xC9] = op("CMP", Immediate, ins::cmp_imm);
    t[0xCA] = op("DEX", Implied, ins::dex);
    t[0xCD] = op("CMP", Absolute, ins::cmp_abs);

    t[0xD0] = op("BNE", Relative, ins::bne);
    t[0xD8] = op("CLD", Implied, ins::cld);
    t[0xDA] = op("PHX", Implied, ins::phx);

    t[0xE0] = op("CPX", Immediate, ins::cpx_imm);
    t[0xE2] = op("SEP", Immediate, ins::sep);
    t[0xE4] = op("CPX", Direct, ins::cpx_dp);
    t[0xE5] = op("SBC", Direct, ins::sbc_dp);
    t[0xE6] = op("INC", Direct, ins::inc_dp);
    t[0xE8] = op("INX", Implied, ins::inx);
    t[0xE9] = op("SBC", Immediate, ins::sbc_imm);
    t[0xEA] = op("NOP", Implied, ins::nop);
    t[0xEB] = op("XBA", Implied, ins::xba);
    t[0xED] = op("SBC", Absolute, ins::sbc_abs);
    t[0xEE] = op("INC", Absolute, ins::inc_abs);

    t[0xF0] = op("BEQ", Relative, ins::beq);
    t[0xF4] = op("PEA", Immediate, ins::pea);
    t[0xF8] = op("SED", Implied, ins::sed);
    t[0xFA] = op("PLX", Implied, ins::plx);
    t[0xFB] = op("XCE", Implied, ins::xce);
    t[0xFC] = op("JSR", AbsoluteIndexedIndirect, ins::jsr_abs_indexed_indirect);
    t[0xFD] = op("SBC", AbsoluteX, ins::sbc_abs_x);
    t[0xFF] = op("SBC", AbsoluteLongX, ins::sbc_long_x);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_expected_entries() {
        let implemented = (0..=255u8).filter(|&code| opcode(code).is_some()).count();
        assert_eq!(implemented, 133);

        let lda = opcode(0xB7).expect("LDA [dp],Y");
        assert_eq!(lda.mnemonic, "LDA");
        assert_eq!(lda.mode, Mode::DirectIndirectLongY);

        assert!(opcode(0x00).is_none(), "BRK is not implemented");
        assert!(opcode(0x42).is_none(), "WDM is not implemented");
    }
}
