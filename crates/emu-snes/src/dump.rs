//! State dumps written when the machine stops.
//!
//! `register_report` is the human-readable summary printed on exit. With a
//! dump directory the raw memories are written too, alongside a JSON
//! snapshot of the CPU registers.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::Snes;
use crate::render::Renderer;

/// CPU register snapshot for `cpu.json`.
#[derive(Debug, Serialize)]
pub struct CpuSnapshot {
    pub a: u16,
    pub x: u16,
    pub y: u16,
    pub sp: u16,
    pub d: u16,
    pub pc: u16,
    pub pbr: u8,
    pub dbr: u8,
    pub p: u8,
    pub emulation: bool,
    pub cycles: u64,
}

impl CpuSnapshot {
    #[must_use]
    pub fn capture<R: Renderer>(snes: &Snes<R>) -> Self {
        let cpu = snes.cpu();
        let regs = &cpu.regs;
        Self {
            a: regs.a,
            x: regs.x,
            y: regs.y,
            sp: regs.sp,
            d: regs.d,
            pc: regs.pc,
            pbr: regs.pbr,
            dbr: regs.dbr,
            p: regs.p.0,
            emulation: regs.e,
            cycles: cpu.total_cycles(),
        }
    }
}

/// Registers, flags, and PPU position as text.
#[must_use]
pub fn register_report<R: Renderer>(snes: &Snes<R>) -> String {
    let regs = &snes.cpu().regs;
    let ppu = &snes.bus().ppu;
    let mut out = String::new();
    let _ = writeln!(out, "PC: ${:02X}:{:04X}", regs.pbr, regs.pc);
    let _ = writeln!(out, "{regs}");
    let _ = writeln!(out, "Cycles: {}", snes.cpu().total_cycles());
    let _ = writeln!(
        out,
        "PPU: frame {} scanline {} dot {}  INIDISP ${:02X} BGMODE ${:02X} VMADD ${:04X} CGADD ${:03X}",
        ppu.frame(),
        ppu.scanline(),
        ppu.dot(),
        ppu.inidisp(),
        ppu.bgmode(),
        ppu.vram_addr(),
        ppu.cgram_addr()
    );
    let _ = writeln!(
        out,
        "NMITIMEN ${:02X}  vblank {}",
        snes.bus().nmitimen(),
        snes.bus().vblank()
    );
    out
}

/// Write `wram.bin`, `vram.bin`, `cgram.bin` and `cpu.json` into `dir`.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn write_dumps<R: Renderer>(snes: &Snes<R>, dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("wram.bin"), &snes.bus().wram)?;
    fs::write(dir.join("vram.bin"), snes.bus().ppu.vram())?;
    fs::write(dir.join("cgram.bin"), snes.bus().ppu.cgram())?;

    let json = serde_json::to_string_pretty(&CpuSnapshot::capture(snes))?;
    fs::write(dir.join("cpu.json"), json)?;
    log::info!("dumps written to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Region, SnesConfig};

    fn make_snes() -> Snes {
        let mut rom = vec![0xEA; 0x8000];
        rom[0x7FFC] = 0x00;
        rom[0x7FFD] = 0x80;
        Snes::new(&SnesConfig {
            rom_data: rom,
            region: Region::Ntsc,
        })
        .expect("valid ROM")
    }

    #[test]
    fn report_contains_registers() {
        let snes = make_snes();
        let report = register_report(&snes);
        assert!(report.contains("PC: $00:8000"));
        assert!(report.contains("S:01FF"));
        assert!(report.contains("NMITIMEN $00"));
    }

    #[test]
    fn snapshot_serializes() {
        let snes = make_snes();
        let json = serde_json::to_value(CpuSnapshot::capture(&snes)).expect("serialize");
        assert_eq!(json["pc"], 0x8000);
        assert_eq!(json["sp"], 0x01FF);
        assert_eq!(json["emulation"], true);
    }

    #[test]
    fn dumps_land_in_directory() {
        let dir = std::env::temp_dir().join(format!("emu-snes-dump-{}", std::process::id()));
        let snes = make_snes();
        write_dumps(&snes, &dir).expect("write dumps");

        assert_eq!(fs::read(dir.join("wram.bin")).unwrap().len(), 128 * 1024);
        assert_eq!(fs::read(dir.join("vram.bin")).unwrap().len(), 32 * 1024);
        assert_eq!(fs::read(dir.join("cgram.bin")).unwrap().len(), 512);
        assert!(dir.join("cpu.json").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
