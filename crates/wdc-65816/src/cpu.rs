//! 65816 CPU implementation.
//!
//! Instruction-level emulation: each `step()` fetches one opcode at
//! `PBR:PC`, dispatches through the static opcode table and returns the
//! instruction's cycle count.

use emu_core::{Bus, Cpu, Fault, Observable, Value};

use crate::flags::{C, D, I, M, N, V, Width, X, Z};
use crate::opcodes::opcode;
use crate::Registers;

/// Reset vector (emulation mode).
const RESET_VECTOR: u32 = 0x00_FFFC;

/// Native-mode NMI vector.
const NMI_VECTOR: u32 = 0x00_FFEA;

/// Cycles to push the return state and load the NMI vector.
const NMI_CYCLES: u32 = 8;

/// The WDC 65C816 CPU.
#[derive(Debug)]
pub struct Wdc65816 {
    /// CPU registers.
    pub regs: Registers,

    /// Total cycles executed (for debugging).
    total_cycles: u64,
}

impl Default for Wdc65816 {
    fn default() -> Self {
        Self::new()
    }
}

impl Wdc65816 {
    /// Create a new 65816 in reset state. Call `reset` to load the vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            total_cycles: 0,
        }
    }

    /// Total cycles executed since creation.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Width of the accumulator and memory operands.
    #[must_use]
    pub fn acc_width(&self) -> Width {
        if self.regs.e || self.regs.p.is_set(M) {
            Width::Byte
        } else {
            Width::Word
        }
    }

    /// Width of the X and Y registers.
    #[must_use]
    pub fn index_width(&self) -> Width {
        if self.regs.e || self.regs.p.is_set(X) {
            Width::Byte
        } else {
            Width::Word
        }
    }

    /// Replace P, keeping M and X forced on in emulation mode.
    pub(crate) fn set_status(&mut self, value: u8) {
        self.regs.p.0 = if self.regs.e { value | M | X } else { value };
    }

    /// Execute one instruction.
    fn execute(&mut self, bus: &mut dyn Bus) -> Result<u32, Fault> {
        let bank = self.regs.pbr;
        let pc = self.regs.pc;
        let code = self.fetch8(bus)?;
        let Some(instruction) = opcode(code) else {
            return Err(Fault::UnknownOpcode {
                opcode: code,
                bank,
                pc,
            });
        };

        log::trace!(
            "{bank:02X}:{pc:04X} {code:02X} {:<4} {:<24} {}",
            instruction.mnemonic,
            format!("{:?}", instruction.mode),
            self.regs
        );

        let cycles = (instruction.exec)(self, bus)?;
        self.total_cycles += u64::from(cycles);
        Ok(cycles)
    }

    /// Enter the NMI handler.
    ///
    /// Pushes PBR, PC and P, then jumps through the vector at $00:FFEA.
    /// The whole sequence runs before anything else can observe the CPU, so
    /// a second NMI cannot interleave with it.
    fn enter_nmi(&mut self, bus: &mut dyn Bus) -> Result<u32, Fault> {
        self.push8(bus, self.regs.pbr)?;
        self.push16(bus, self.regs.pc)?;
        self.push8(bus, self.regs.p.0)?;
        self.regs.p.set(I);
        self.regs.p.clear(D);
        self.regs.pbr = 0;
        self.regs.pc = bus.read16(NMI_VECTOR)?;
        log::debug!("NMI -> $00:{:04X}", self.regs.pc);
        self.total_cycles += u64::from(NMI_CYCLES);
        Ok(NMI_CYCLES)
    }

    fn reset_from(&mut self, bus: &mut dyn Bus) -> Result<(), Fault> {
        self.regs = Registers::new();
        self.regs.pc = bus.read16(RESET_VECTOR)?;
        log::info!("reset vector ${:04X}", self.regs.pc);
        Ok(())
    }
}

impl<B: Bus> Cpu<B> for Wdc65816 {
    fn step(&mut self, bus: &mut B) -> Result<u32, Fault> {
        self.execute(bus)
    }

    fn reset(&mut self, bus: &mut B) -> Result<(), Fault> {
        self.reset_from(bus)
    }

    fn nmi(&mut self, bus: &mut B) -> Result<u32, Fault> {
        self.enter_nmi(bus)
    }

    fn pc(&self) -> u32 {
        self.regs.program_counter()
    }
}

impl Observable for Wdc65816 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(Value::Address(self.regs.program_counter())),
            "pbr" => Some(self.regs.pbr.into()),
            "dbr" => Some(self.regs.dbr.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "sp" | "s" => Some(self.regs.sp.into()),
            "d" => Some(self.regs.d.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "e" => Some(self.regs.e.into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.m" => Some(self.regs.p.is_set(M).into()),
            "flags.x" => Some(self.regs.p.is_set(X).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "cycles" => Some(Value::U64(self.total_cycles)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "pbr", "dbr", "a", "x", "y", "sp", "d", "p", "e", "flags.n", "flags.v",
            "flags.m", "flags.x", "flags.d", "flags.i", "flags.z", "flags.c", "cycles",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    #[test]
    fn test_reset_loads_vector() {
        let mut cpu = Wdc65816::new();
        let mut bus = SimpleBus::new();
        bus.load(0xFFFC, &[0x00, 0x80]);

        cpu.reset(&mut bus).expect("reset");

        assert_eq!(cpu.regs.pc, 0x8000);
        assert!(cpu.regs.e);
        assert_eq!(cpu.regs.sp, 0x01FF);
        assert!(cpu.regs.p.is_set(M) && cpu.regs.p.is_set(X));
    }

    #[test]
    fn test_lda_immediate() {
        let mut cpu = Wdc65816::new();
        let mut bus = SimpleBus::new();

        // LDA #$42
        bus.load(0x8000, &[0xA9, 0x42]);
        cpu.regs.pc = 0x8000;

        let cycles = cpu.step(&mut bus).expect("step");

        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x8002);
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_unknown_opcode_faults() {
        let mut cpu = Wdc65816::new();
        let mut bus = SimpleBus::new();

        // WDM is not implemented
        bus.load(0x01_2345, &[0x42]);
        cpu.regs.pbr = 0x01;
        cpu.regs.pc = 0x2345;

        assert_eq!(
            cpu.step(&mut bus),
            Err(Fault::UnknownOpcode {
                opcode: 0x42,
                bank: 0x01,
                pc: 0x2345,
            })
        );
    }

    #[test]
    fn test_nmi_pushes_state() {
        let mut cpu = Wdc65816::new();
        let mut bus = SimpleBus::new();
        bus.load(0xFFEA, &[0x00, 0x90]);
        cpu.regs.e = false;
        cpu.regs.sp = 0x1FFF;
        cpu.regs.pbr = 0x12;
        cpu.regs.pc = 0x3456;
        cpu.regs.p.0 = D | C;

        let cycles = cpu.nmi(&mut bus).expect("nmi");

        assert_eq!(cycles, 8);
        assert_eq!(bus.peek(0x1FFF), 0x12, "PBR pushed first");
        assert_eq!(bus.peek(0x1FFE), 0x34, "PC high");
        assert_eq!(bus.peek(0x1FFD), 0x56, "PC low");
        assert_eq!(bus.peek(0x1FFC), D | C, "P pushed last");
        assert_eq!(cpu.regs.sp, 0x1FFB);
        assert_eq!(cpu.regs.pbr, 0);
        assert_eq!(cpu.regs.pc, 0x9000);
        assert!(cpu.regs.p.is_set(I));
        assert!(!cpu.regs.p.is_set(D));
    }

    #[test]
    fn test_observable_paths() {
        let mut cpu = Wdc65816::new();
        cpu.regs.pbr = 0x80;
        cpu.regs.pc = 0x1234;
        assert_eq!(cpu.query("pc"), Some(Value::Address(0x80_1234)));
        assert_eq!(cpu.query("flags.m"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("e"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("nonsense"), None);
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path} should resolve");
        }
    }
}
