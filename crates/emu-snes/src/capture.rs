//! Headless capture: PNG screenshots.

#![allow(clippy::cast_possible_truncation)]

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::Snes;
use crate::render::Renderer;

/// Convert ARGB32 pixels to RGBA bytes.
fn argb_to_rgba(framebuffer: &[u32]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(framebuffer.len() * 4);
    for &pixel in framebuffer {
        rgba.push((pixel >> 16) as u8);
        rgba.push((pixel >> 8) as u8);
        rgba.push(pixel as u8);
        rgba.push(0xFF);
    }
    rgba
}

/// Save the current framebuffer as a PNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot<R: Renderer>(snes: &Snes<R>, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        snes.framebuffer_width(),
        snes.framebuffer_height(),
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&argb_to_rgba(snes.framebuffer()))?;
    log::info!("screenshot saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_order() {
        assert_eq!(
            argb_to_rgba(&[0xFF12_3456, 0x00AB_CDEF]),
            vec![0x12, 0x34, 0x56, 0xFF, 0xAB, 0xCD, 0xEF, 0xFF]
        );
    }
}
