//! CPU core trait.

use crate::{Bus, Fault};

/// A CPU core.
///
/// The bus is passed in, not owned, so the machine can hand the same bus to
/// other components between instructions. Every method that touches the bus
/// can fault.
pub trait Cpu<B: Bus> {
    /// Execute one instruction. Returns the number of CPU cycles it took.
    fn step(&mut self, bus: &mut B) -> Result<u32, Fault>;

    /// Reset the CPU and load the program counter from the reset vector.
    fn reset(&mut self, bus: &mut B) -> Result<(), Fault>;

    /// Take a non-maskable interrupt. Returns the cycles spent on entry.
    fn nmi(&mut self, bus: &mut B) -> Result<u32, Fault>;

    /// Returns the current program counter.
    ///
    /// Returns `u32` so 24-bit CPUs can report their bank as well.
    fn pc(&self) -> u32;
}
