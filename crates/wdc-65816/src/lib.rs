//! Cycle-counted 65C816 CPU emulator.
//!
//! The 65816 executes one whole instruction per `step()` and reports how
//! many CPU cycles it took. Accumulator and index widths are runtime
//! properties selected by the M and X flags (or forced to 8 bits in
//! emulation mode), so every width-sensitive instruction branches on a
//! [`Width`] at execution time.

mod addressing;
mod alu;
mod cpu;
pub mod flags;
mod instructions;
mod opcodes;
mod registers;

pub use addressing::Mode;
pub use cpu::Wdc65816;
pub use flags::{Status, Width};
pub use opcodes::{Instruction, opcode};
pub use registers::Registers;
