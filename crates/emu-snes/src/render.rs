//! Frame rendering.
//!
//! The machine calls its [`Renderer`] once per frame, at the vblank rising
//! edge. [`TileRenderer`] draws background 1 as 4bpp tiles, which is
//! enough to see what a ROM has put in VRAM and CGRAM.

#![allow(clippy::cast_possible_truncation)]

use crate::ppu::{Ppu, VRAM_SIZE};

/// Framebuffer width in pixels.
pub const FB_WIDTH: u32 = 256;
/// Framebuffer height in pixels (visible scanlines).
pub const FB_HEIGHT: u32 = 224;

const TILES_PER_ROW: usize = 32;
const TILE_SIZE: usize = 8;
/// Bytes per 8x8 tile at 4 bits per pixel.
const TILE_BYTES_4BPP: usize = 32;
const VRAM_MASK: usize = VRAM_SIZE - 1;

/// Consumes VRAM/CGRAM once per frame and produces a picture.
pub trait Renderer {
    /// Draw the current PPU state.
    fn render(&mut self, ppu: &Ppu);

    /// The last frame drawn, ARGB32, `FB_WIDTH * FB_HEIGHT` pixels.
    fn framebuffer(&self) -> &[u32];
}

/// BG1-only 4bpp tile renderer.
pub struct TileRenderer {
    framebuffer: Vec<u32>,
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            framebuffer: vec![0xFF00_0000; (FB_WIDTH * FB_HEIGHT) as usize],
        }
    }
}

/// Convert a BGR555 colour to opaque ARGB32.
#[must_use]
pub fn bgr555_to_argb(color: u16) -> u32 {
    let expand = |c: u16| -> u32 {
        let c = u32::from(c & 0x1F);
        (c << 3) | (c >> 2)
    };
    let r = expand(color);
    let g = expand(color >> 5);
    let b = expand(color >> 10);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

fn cgram_color(ppu: &Ppu, index: usize) -> u16 {
    let cgram = ppu.cgram();
    let offset = (index * 2) % cgram.len();
    u16::from_le_bytes([cgram[offset], cgram[offset + 1]])
}

fn vram_word(vram: &[u8], address: usize) -> u16 {
    let address = address & VRAM_MASK;
    u16::from_le_bytes([vram[address], vram[(address + 1) & VRAM_MASK]])
}

/// Colour index (0–15) of one pixel of a 4bpp tile.
fn tile_pixel(vram: &[u8], tile: usize, x: usize, y: usize) -> usize {
    let row = tile * TILE_BYTES_4BPP + y * 2;
    let bit = 7 - x;
    let plane = |offset: usize| usize::from((vram[(row + offset) & VRAM_MASK] >> bit) & 1);
    plane(0) | (plane(1) << 1) | (plane(16) << 2) | (plane(17) << 3)
}

impl Renderer for TileRenderer {
    fn render(&mut self, ppu: &Ppu) {
        if ppu.forced_blank() {
            self.framebuffer.fill(0xFF00_0000);
            return;
        }

        let vram = ppu.vram();
        let backdrop = bgr555_to_argb(cgram_color(ppu, 0));
        // BG1SC bits 2-7 are the tilemap word address in 1K-word steps.
        let tilemap = usize::from(ppu.bg_sc(0) >> 2) << 11;
        let width = FB_WIDTH as usize;

        for (y, line) in self.framebuffer.chunks_exact_mut(width).enumerate() {
            let tile_row = y / TILE_SIZE;
            for (x, pixel) in line.iter_mut().enumerate() {
                let tile_col = x / TILE_SIZE;
                let entry = vram_word(vram, tilemap + (tile_row * TILES_PER_ROW + tile_col) * 2);

                let tile = usize::from(entry & 0x03FF);
                let palette = usize::from((entry >> 10) & 0x07);
                let mut fine_x = x % TILE_SIZE;
                let mut fine_y = y % TILE_SIZE;
                if entry & 0x4000 != 0 {
                    fine_x = 7 - fine_x;
                }
                if entry & 0x8000 != 0 {
                    fine_y = 7 - fine_y;
                }

                let color = tile_pixel(vram, tile, fine_x, fine_y);
                *pixel = if color == 0 {
                    backdrop
                } else {
                    bgr555_to_argb(cgram_color(ppu, palette * 16 + color))
                };
            }
        }
    }

    fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }
}
