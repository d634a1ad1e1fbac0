//! Core traits and types for cycle-counted emulation.
//!
//! The CPU talks to the rest of the machine only through [`Bus`]. Every bus
//! access is fallible: an access the hardware model cannot satisfy is a
//! [`Fault`], and faults are never recovered from.

mod bus;
mod clock;
mod cpu;
mod fault;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use fault::{Access, Fault};
pub use observable::{Observable, Value};
pub use ticks::Ticks;
