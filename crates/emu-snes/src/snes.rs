//! Top-level SNES system.
//!
//! The master clock ticks at 21,477,272 Hz (NTSC crystal). Components
//! derive their timing from it:
//! - CPU: one cycle = 8 master ticks (the slow-ROM rate, used throughout)
//! - PPU: one dot = 4 master ticks
//!
//! So each CPU cycle advances the PPU by two dots. One frame is
//! 341 dots × 262 scanlines.

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Cpu, Fault, MasterClock, Observable, Ticks, Value};
use wdc_65816::Wdc65816;

use crate::bus::SnesBus;
use crate::config::SnesConfig;
use crate::ppu::PpuEvent;
use crate::render::{FB_HEIGHT, FB_WIDTH, Renderer, TileRenderer};
use crate::SnesError;

/// Crystal divisors.
const CPU_DIVISOR: u64 = 8;
const DOT_DIVISOR: u64 = 4;

/// SNES system.
pub struct Snes<R: Renderer = TileRenderer> {
    cpu: Wdc65816,
    bus: SnesBus,
    renderer: R,
    clock: MasterClock,
    /// Master ticks elapsed since reset.
    master_ticks: Ticks,
    /// Frames rendered (vblank rising edges).
    frame_count: u64,
}

impl Snes<TileRenderer> {
    /// Create a new SNES with the built-in BG1 renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is empty or the reset vector can't be
    /// read.
    pub fn new(config: &SnesConfig) -> Result<Self, SnesError> {
        Self::with_renderer(config, TileRenderer::new())
    }
}

impl<R: Renderer> Snes<R> {
    /// Create a new SNES that draws frames through `renderer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is empty or the reset vector can't be
    /// read.
    pub fn with_renderer(config: &SnesConfig, renderer: R) -> Result<Self, SnesError> {
        if config.rom_data.is_empty() {
            return Err(SnesError::EmptyRom);
        }
        log::info!(
            "ROM: {} bytes ({} KiB), {:?}",
            config.rom_data.len(),
            config.rom_data.len() / 1024,
            config.region
        );

        let mut bus = SnesBus::new(
            config.rom_data.clone(),
            config.region.scanlines_per_frame(),
        );
        let mut cpu = Wdc65816::new();
        cpu.reset(&mut bus)?;

        Ok(Self {
            cpu,
            bus,
            renderer,
            clock: MasterClock::new(config.region.crystal_hz()),
            master_ticks: Ticks::ZERO,
            frame_count: 0,
        })
    }

    /// Execute one instruction and advance the PPU by the same amount of
    /// time. An NMI raised along the way is entered before this returns.
    ///
    /// Returns the CPU cycles consumed, NMI entry included.
    ///
    /// # Errors
    ///
    /// Any [`Fault`] from the CPU or the bus. The machine is not usable
    /// afterwards.
    pub fn step(&mut self) -> Result<u32, Fault> {
        let mut cycles = self.cpu.step(&mut self.bus)?;
        let mut total = 0;
        while cycles > 0 {
            total += cycles;
            cycles = self.advance(cycles)?;
        }
        Ok(total)
    }

    /// Run until the next frame has been rendered.
    ///
    /// Returns the number of master ticks executed.
    ///
    /// # Errors
    ///
    /// Any [`Fault`] raised while running.
    pub fn run_frame(&mut self) -> Result<u64, Fault> {
        let start = self.master_ticks;
        let target = self.frame_count + 1;
        while self.frame_count < target {
            self.step()?;
        }
        Ok((self.master_ticks - start).get())
    }

    /// Advance the PPU by `cycles` CPU cycles and handle vblank edges.
    /// Returns the cycles spent entering an NMI, if one fired.
    fn advance(&mut self, cycles: u32) -> Result<u32, Fault> {
        let ticks = Ticks::from_cycles(u64::from(cycles), CPU_DIVISOR);
        self.master_ticks += ticks;
        self.bus.ppu.tick(ticks.to_cycles(DOT_DIVISOR) as u32);

        let mut nmi_cycles = 0;
        while let Some(event) = self.bus.ppu.poll() {
            match event {
                PpuEvent::VblankStart => {
                    self.renderer.render(&self.bus.ppu);
                    self.frame_count += 1;
                    if self.bus.set_vblank(true) {
                        nmi_cycles += self.cpu.nmi(&mut self.bus)?;
                    }
                }
                PpuEvent::VblankEnd => {
                    self.bus.set_vblank(false);
                }
            }
        }
        Ok(nmi_cycles)
    }

    /// Reference to the framebuffer (ARGB32, 256x224).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.renderer.framebuffer()
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        FB_WIDTH
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        FB_HEIGHT
    }

    #[must_use]
    pub fn cpu(&self) -> &Wdc65816 {
        &self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &SnesBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SnesBus {
        &mut self.bus
    }

    #[must_use]
    pub fn master_ticks(&self) -> Ticks {
        self.master_ticks
    }

    /// Emulated time since reset, in seconds.
    #[must_use]
    pub fn emulated_seconds(&self) -> f64 {
        self.clock.seconds(self.master_ticks)
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Parse `$7F0000`, `0x7F0000`, `7F:0000` or a decimal address.
fn parse_address(text: &str) -> Option<u32> {
    if let Some(hex) = text
        .strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
    {
        return u32::from_str_radix(&hex.replace(':', ""), 16).ok();
    }
    if text.contains(':') {
        return u32::from_str_radix(&text.replace(':', ""), 16).ok();
    }
    text.parse().ok()
}

impl<R: Renderer> Observable for Snes<R> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            let ppu = &self.bus.ppu;
            match rest {
                "scanline" => Some(ppu.scanline().into()),
                "dot" => Some(Value::U16(ppu.dot() as u16)),
                "frame" => Some(ppu.frame().into()),
                "vram_addr" => Some(ppu.vram_addr().into()),
                "cgram_addr" => Some(ppu.cgram_addr().into()),
                "inidisp" => Some(ppu.inidisp().into()),
                "bgmode" => Some(ppu.bgmode().into()),
                "vmain" => Some(ppu.vmain().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("bus.") {
            match rest {
                "nmitimen" => Some(self.bus.nmitimen().into()),
                "vblank" => Some(self.bus.vblank().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let address = parse_address(rest)?;
            self.bus.peek(address).map(Value::U8)
        } else {
            match path {
                "master_ticks" => Some(self.master_ticks.get().into()),
                "frame_count" => Some(self.frame_count.into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<65816_paths>",
            "ppu.scanline",
            "ppu.dot",
            "ppu.frame",
            "ppu.vram_addr",
            "ppu.cgram_addr",
            "ppu.inidisp",
            "ppu.bgmode",
            "ppu.vmain",
            "bus.nmitimen",
            "bus.vblank",
            "memory.<address>",
            "master_ticks",
            "frame_count",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;

    /// 32 KiB LoROM with `code` at $00:8000, `nmi` at $00:9000 and the
    /// reset/NMI vectors pointing at them.
    fn make_rom(code: &[u8], nmi: &[u8]) -> Vec<u8> {
        let mut rom = vec![0xEA; 0x8000];
        rom[..code.len()].copy_from_slice(code);
        rom[0x1000..0x1000 + nmi.len()].copy_from_slice(nmi);
        rom[0x7FEA] = 0x00;
        rom[0x7FEB] = 0x90;
        rom[0x7FFC] = 0x00;
        rom[0x7FFD] = 0x80;
        rom
    }

    fn make_snes(code: &[u8], nmi: &[u8]) -> Snes {
        let config = SnesConfig {
            rom_data: make_rom(code, nmi),
            region: Region::Ntsc,
        };
        Snes::new(&config).expect("valid ROM")
    }

    /// BRA to itself: 3 cycles per step, never leaves the page.
    const SPIN: [u8; 2] = [0x80, 0xFE];

    #[test]
    fn reset_loads_vector() {
        let snes = make_snes(&SPIN, &SPIN);
        assert_eq!(snes.query("cpu.pc"), Some(Value::Address(0x00_8000)));
        assert_eq!(snes.query("cpu.e"), Some(Value::Bool(true)));
    }

    #[test]
    fn empty_rom_is_rejected() {
        let config = SnesConfig {
            rom_data: Vec::new(),
            region: Region::Ntsc,
        };
        assert!(matches!(Snes::new(&config), Err(SnesError::EmptyRom)));
    }

    #[test]
    fn step_advances_ppu_two_dots_per_cycle() {
        let mut snes = make_snes(&SPIN, &SPIN);
        assert_eq!(snes.step().unwrap(), 3);
        assert_eq!(snes.master_ticks(), Ticks::new(24));
        assert_eq!(snes.bus().ppu.dot(), 6);
    }

    #[test]
    fn run_frame_stops_at_vblank() {
        let mut snes = make_snes(&SPIN, &SPIN);
        let ticks = snes.run_frame().unwrap();
        assert_eq!(snes.frame_count(), 1);
        assert!(snes.bus().vblank());
        assert_eq!(snes.bus().ppu.scanline(), 226);
        // 226 scanlines of 341 dots, rounded up to a whole 6-dot step.
        let dots: u64 = 226 * 341;
        assert_eq!(ticks, dots.div_ceil(6) * 24);
        assert!(snes.emulated_seconds() > 0.0);
    }

    #[test]
    fn second_frame_clears_and_resets_vblank() {
        let mut snes = make_snes(&SPIN, &SPIN);
        snes.run_frame().unwrap();
        snes.run_frame().unwrap();
        assert_eq!(snes.frame_count(), 2);
        assert_eq!(snes.bus().ppu.frame(), 1);
    }

    #[test]
    fn vblank_nmi_enters_handler() {
        // LDA #$80 ; STA $4200 ; BRA *
        let code = [0xA9, 0x80, 0x8D, 0x00, 0x42, 0x80, 0xFE];
        let mut snes = make_snes(&code, &SPIN);
        snes.run_frame().unwrap();

        assert_eq!(snes.cpu().regs.pc, 0x9000);
        assert_eq!(snes.query("cpu.flags.i"), Some(Value::Bool(true)));
        assert_eq!(snes.query("bus.nmitimen"), Some(Value::U8(0x80)));
    }

    #[test]
    fn emulation_mode_nmi_keeps_stack_balanced() {
        // LDA #$80 ; STA $4200 ; BRA *, never leaving emulation mode
        let code = [0xA9, 0x80, 0x8D, 0x00, 0x42, 0x80, 0xFE];
        let mut snes = make_snes(&code, &[0x40]);

        for _ in 0..4 {
            snes.run_frame().unwrap();
            assert_eq!(snes.cpu().regs.pc, 0x9000);
            assert_eq!(snes.cpu().regs.sp, 0x01FB);
        }

        snes.step().unwrap();
        assert_eq!(snes.cpu().regs.sp, 0x01FF);
        assert_eq!(snes.cpu().regs.pc, 0x8005);
    }

    #[test]
    fn masked_nmi_keeps_running_main_loop() {
        let mut snes = make_snes(&SPIN, &SPIN);
        snes.run_frame().unwrap();
        assert_eq!(snes.cpu().regs.pc, 0x8000);
    }

    #[test]
    fn fault_is_returned_from_step() {
        // JML $FF:0000
        let mut snes = make_snes(&[0x5C, 0x00, 0x00, 0xFF], &SPIN);
        snes.step().unwrap();
        assert!(matches!(
            snes.step(),
            Err(Fault::UnmappedBank { bank: 0xFF, .. })
        ));
    }

    #[test]
    fn observable_memory_and_ppu() {
        let mut snes = make_snes(&SPIN, &SPIN);
        snes.bus_mut().wram[0x1_0010] = 0xAB;
        assert_eq!(snes.query("memory.$7F0010"), Some(Value::U8(0xAB)));
        assert_eq!(snes.query("memory.7F:0010"), Some(Value::U8(0xAB)));
        assert_eq!(snes.query("memory.0x008000"), Some(Value::U8(0x80)));
        assert_eq!(snes.query("memory.$FF0000"), None);
        assert_eq!(snes.query("ppu.scanline"), Some(Value::U16(0)));
        assert_eq!(snes.query("bus.vblank"), Some(Value::Bool(false)));
        assert_eq!(snes.query("frame_count"), Some(Value::U64(0)));
    }

    #[test]
    fn framebuffer_correct_size() {
        let snes = make_snes(&SPIN, &SPIN);
        assert_eq!(
            snes.framebuffer().len(),
            snes.framebuffer_width() as usize * snes.framebuffer_height() as usize
        );
    }
}
