//! SNES configuration.

use std::fs;
use std::path::Path;

use crate::SnesError;

/// Video region. Sets the master crystal and the frame length.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// NTSC: 60 Hz, 262 scanlines.
    #[default]
    Ntsc,
    /// PAL: 50 Hz, 312 scanlines.
    Pal,
}

impl Region {
    /// Master crystal frequency in Hz.
    #[must_use]
    pub const fn crystal_hz(self) -> u64 {
        match self {
            Self::Ntsc => 21_477_272,
            Self::Pal => 21_281_370,
        }
    }

    /// Total scanlines per frame, including vblank.
    #[must_use]
    pub const fn scanlines_per_frame(self) -> u16 {
        match self {
            Self::Ntsc => 262,
            Self::Pal => 312,
        }
    }
}

/// SNES configuration.
pub struct SnesConfig {
    /// Raw ROM image (LoROM, no copier header).
    pub rom_data: Vec<u8>,
    /// Video region. Defaults to NTSC.
    pub region: Region,
}

impl SnesConfig {
    /// Load a ROM image from disk with the default region.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, SnesError> {
        let rom_data = fs::read(path).map_err(|source| SnesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            rom_data,
            region: Region::default(),
        })
    }
}
