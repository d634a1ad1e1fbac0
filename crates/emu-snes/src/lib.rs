//! SNES emulator core: LoROM bus, DMA, PPU register frontend, and the
//! machine that drives a 65C816 against them.
//!
//! The master clock ticks at 21,477,272 Hz (NTSC crystal). A CPU cycle
//! is 8 master ticks and a PPU dot is 4, so the PPU runs two dots per CPU
//! cycle. One frame = 341 dots × 262 scanlines.

pub mod apu;
mod bus;
pub mod capture;
mod config;
pub mod dump;
mod error;
pub mod hdma;
pub mod math;
pub mod ppu;
pub mod render;
mod snes;

pub use bus::{SnesBus, WRAM_SIZE};
pub use config::{Region, SnesConfig};
pub use error::SnesError;
pub use snes::Snes;
