//! Video register frontend.
//!
//! Holds the PPU registers the CPU can write, the VRAM and CGRAM backing
//! stores, and the dot/scanline counters that produce the vblank edges.
//! Pixel output is the renderer's job (see [`crate::render`]).
//!
//! ## Timing
//! 341 dots per scanline, 262 (NTSC) or 312 (PAL) scanlines per frame.
//! When a scanline completes, the counter is checked *before* it
//! advances: finishing scanline 0 ends vblank, finishing scanline 225
//! starts it.

#![allow(clippy::cast_possible_truncation)]

use std::collections::VecDeque;

/// VRAM size in bytes.
pub const VRAM_SIZE: usize = 32 * 1024;
/// CGRAM size in bytes (256 BGR555 colours).
pub const CGRAM_SIZE: usize = 512;
/// Dots per scanline.
pub const DOTS_PER_SCANLINE: u32 = 341;
/// Scanline whose completion clears vblank.
const VBLANK_END_LINE: u16 = 0;
/// Scanline whose completion sets vblank.
const VBLANK_START_LINE: u16 = 225;

const VRAM_MASK: usize = VRAM_SIZE - 1;

/// A vblank edge reported by [`Ppu::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuEvent {
    /// Blanking begins; the frame is ready to draw.
    VblankStart,
    /// The visible frame begins.
    VblankEnd,
}

/// PPU register state plus VRAM/CGRAM.
pub struct Ppu {
    vram: Vec<u8>,
    cgram: Vec<u8>,

    inidisp: u8,
    bgmode: u8,
    bg_sc: [u8; 4],
    vmain: u8,
    vram_addr: u16,
    cgram_addr: u16,
    coldata: u8,

    dot: u32,
    scanline: u16,
    scanlines_per_frame: u16,
    frame: u64,
    events: VecDeque<PpuEvent>,
}

impl Ppu {
    #[must_use]
    pub fn new(scanlines_per_frame: u16) -> Self {
        Self {
            vram: vec![0; VRAM_SIZE],
            cgram: vec![0; CGRAM_SIZE],
            inidisp: 0,
            bgmode: 0,
            bg_sc: [0; 4],
            vmain: 0,
            vram_addr: 0,
            cgram_addr: 0,
            coldata: 0,
            dot: 0,
            scanline: 0,
            scanlines_per_frame,
            frame: 0,
            events: VecDeque::new(),
        }
    }

    // Counters

    /// Advance the dot counter. Vblank edges crossed along the way are
    /// queued for [`poll`](Self::poll).
    pub fn tick(&mut self, dots: u32) {
        self.dot += dots;
        while self.dot >= DOTS_PER_SCANLINE {
            self.dot -= DOTS_PER_SCANLINE;
            match self.scanline {
                VBLANK_END_LINE => self.events.push_back(PpuEvent::VblankEnd),
                VBLANK_START_LINE => self.events.push_back(PpuEvent::VblankStart),
                _ => {}
            }
            self.scanline += 1;
            if self.scanline == self.scanlines_per_frame {
                self.scanline = 0;
                self.frame += 1;
            }
        }
    }

    /// Take the oldest pending vblank edge.
    pub fn poll(&mut self) -> Option<PpuEvent> {
        self.events.pop_front()
    }

    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    #[must_use]
    pub fn dot(&self) -> u32 {
        self.dot
    }

    /// Completed frames.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // Register writes

    /// $2100 INIDISP.
    pub fn write_inidisp(&mut self, value: u8) {
        self.inidisp = value;
    }

    /// $2105 BGMODE.
    pub fn write_bgmode(&mut self, value: u8) {
        self.bgmode = value;
    }

    /// $2107–$210A BGnSC. `index` is the background number minus one.
    pub fn write_bg_sc(&mut self, index: usize, value: u8) {
        self.bg_sc[index] = value;
    }

    /// $2115 VMAIN.
    pub fn write_vmain(&mut self, value: u8) {
        self.vmain = value;
    }

    /// $2116 VMADDL.
    pub fn write_vmadd_low(&mut self, value: u8) {
        self.vram_addr = (self.vram_addr & 0xFF00) | u16::from(value);
    }

    /// $2117 VMADDH.
    pub fn write_vmadd_high(&mut self, value: u8) {
        self.vram_addr = (self.vram_addr & 0x00FF) | (u16::from(value) << 8);
    }

    /// $2116/$2117 as one 16-bit write.
    pub fn write_vmadd(&mut self, value: u16) {
        self.vram_addr = value;
    }

    /// $2118 VMDATAL.
    pub fn write_vmdata_low(&mut self, value: u8) {
        let index = self.vram_index();
        self.vram[index] = value;
        if !self.increment_on_high() {
            self.increment_vram_addr();
        }
    }

    /// $2119 VMDATAH.
    pub fn write_vmdata_high(&mut self, value: u8) {
        let index = self.vram_index() + 1;
        self.vram[index] = value;
        if self.increment_on_high() {
            self.increment_vram_addr();
        }
    }

    /// $2118/$2119 as one 16-bit write. Increments once.
    pub fn write_vmdata(&mut self, value: u16) {
        let index = self.vram_index();
        let [lo, hi] = value.to_le_bytes();
        self.vram[index] = lo;
        self.vram[index + 1] = hi;
        self.increment_vram_addr();
    }

    /// $2121 CGADD. Selects a colour; the byte pointer is twice that.
    pub fn write_cgadd(&mut self, value: u8) {
        self.cgram_addr = u16::from(value) * 2;
    }

    /// $2122 CGDATA.
    pub fn write_cgdata(&mut self, value: u8) {
        self.cgram[usize::from(self.cgram_addr)] = value;
        self.cgram_addr = (self.cgram_addr + 1) % CGRAM_SIZE as u16;
    }

    /// $2132 COLDATA.
    pub fn write_coldata(&mut self, value: u8) {
        self.coldata = value;
    }

    fn vram_index(&self) -> usize {
        (usize::from(self.vram_addr) << 1) & VRAM_MASK
    }

    fn increment_on_high(&self) -> bool {
        self.vmain & 0x80 != 0
    }

    fn increment_vram_addr(&mut self) {
        let step = match self.vmain & 0x03 {
            0 => 1,
            1 => 32,
            _ => 128,
        };
        self.vram_addr = self.vram_addr.wrapping_add(step);
    }

    // State access for the renderer, dumps and queries

    #[must_use]
    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    #[must_use]
    pub fn cgram(&self) -> &[u8] {
        &self.cgram
    }

    #[must_use]
    pub fn inidisp(&self) -> u8 {
        self.inidisp
    }

    /// Forced blank (INIDISP bit 7).
    #[must_use]
    pub fn forced_blank(&self) -> bool {
        self.inidisp & 0x80 != 0
    }

    #[must_use]
    pub fn bgmode(&self) -> u8 {
        self.bgmode
    }

    #[must_use]
    pub fn bg_sc(&self, index: usize) -> u8 {
        self.bg_sc[index]
    }

    #[must_use]
    pub fn vmain(&self) -> u8 {
        self.vmain
    }

    /// VRAM word address.
    #[must_use]
    pub fn vram_addr(&self) -> u16 {
        self.vram_addr
    }

    /// CGRAM byte pointer.
    #[must_use]
    pub fn cgram_addr(&self) -> u16 {
        self.cgram_addr
    }

    #[must_use]
    pub fn coldata(&self) -> u8 {
        self.coldata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ppu() -> Ppu {
        Ppu::new(262)
    }

    #[test]
    fn vmdata_increments_after_low_write_by_default() {
        let mut ppu = ppu();
        ppu.write_vmadd(0x0010);
        ppu.write_vmdata_low(0xAB);
        assert_eq!(ppu.vram_addr(), 0x0011);
        ppu.write_vmdata_high(0xCD);
        assert_eq!(ppu.vram_addr(), 0x0011);
        assert_eq!(ppu.vram()[0x20], 0xAB);
        assert_eq!(ppu.vram()[0x23], 0xCD);
    }

    #[test]
    fn vmdata_increments_after_high_write_with_vmain_bit7() {
        let mut ppu = ppu();
        ppu.write_vmain(0x80);
        ppu.write_vmadd_low(0x00);
        ppu.write_vmadd_high(0x10);
        ppu.write_vmdata_low(0x34);
        ppu.write_vmdata_high(0x12);
        assert_eq!(ppu.vram_addr(), 0x1001);
        assert_eq!(&ppu.vram()[0x2000..0x2002], &[0x34, 0x12]);
    }

    #[test]
    fn word_write_increments_once_by_step() {
        let mut ppu = ppu();
        ppu.write_vmain(0x81);
        ppu.write_vmadd(0x0000);
        ppu.write_vmdata(0xBEEF);
        assert_eq!(ppu.vram_addr(), 32);
        assert_eq!(&ppu.vram()[0..2], &[0xEF, 0xBE]);

        ppu.write_vmain(0x83);
        ppu.write_vmdata(0x0001);
        assert_eq!(ppu.vram_addr(), 32 + 128);
    }

    #[test]
    fn vram_address_masks_to_32k() {
        let mut ppu = ppu();
        ppu.write_vmadd(0xC000);
        ppu.write_vmdata(0x5566);
        assert_eq!(&ppu.vram()[0..2], &[0x66, 0x55]);
    }

    #[test]
    fn cgram_writes_are_sequential_and_wrap() {
        let mut ppu = ppu();
        ppu.write_cgadd(0xFF);
        assert_eq!(ppu.cgram_addr(), 0x1FE);
        ppu.write_cgdata(0x1F);
        ppu.write_cgdata(0x7C);
        ppu.write_cgdata(0x42);
        assert_eq!(ppu.cgram()[0x1FE], 0x1F);
        assert_eq!(ppu.cgram()[0x1FF], 0x7C);
        assert_eq!(ppu.cgram()[0], 0x42);
        assert_eq!(ppu.cgram_addr(), 1);
    }

    #[test]
    fn first_scanline_ends_vblank() {
        let mut ppu = ppu();
        ppu.tick(340);
        assert_eq!(ppu.poll(), None);
        ppu.tick(1);
        assert_eq!(ppu.poll(), Some(PpuEvent::VblankEnd));
        assert_eq!(ppu.scanline(), 1);
        assert_eq!(ppu.dot(), 0);
    }

    #[test]
    fn vblank_starts_after_scanline_225() {
        let mut ppu = ppu();
        ppu.tick(DOTS_PER_SCANLINE * 225);
        assert_eq!(ppu.poll(), Some(PpuEvent::VblankEnd));
        assert_eq!(ppu.poll(), None);
        ppu.tick(DOTS_PER_SCANLINE);
        assert_eq!(ppu.poll(), Some(PpuEvent::VblankStart));
        assert_eq!(ppu.scanline(), 226);
    }

    #[test]
    fn frame_counter_wraps_scanline() {
        let mut ppu = Ppu::new(312);
        ppu.tick(DOTS_PER_SCANLINE * 312);
        assert_eq!(ppu.frame(), 1);
        assert_eq!(ppu.scanline(), 0);

        let mut ntsc = ppu_with_frames(2);
        assert_eq!(ntsc.frame(), 2);
        assert_eq!(ntsc.poll(), Some(PpuEvent::VblankEnd));
    }

    fn ppu_with_frames(frames: u32) -> Ppu {
        let mut ppu = ppu();
        for _ in 0..frames * 262 {
            ppu.tick(DOTS_PER_SCANLINE);
        }
        ppu
    }

    #[test]
    fn forced_blank_bit() {
        let mut ppu = ppu();
        ppu.write_inidisp(0x8F);
        assert!(ppu.forced_blank());
        ppu.write_inidisp(0x0F);
        assert!(!ppu.forced_blank());
    }
}
