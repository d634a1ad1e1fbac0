//! SNES emulator binary.
//!
//! Runs a LoROM image headlessly until it faults or a frame limit is hit,
//! then prints the register report and optionally writes dumps and a
//! screenshot.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_snes::{Region, Snes, SnesConfig, capture, dump};

#[derive(Parser, Debug)]
#[command(name = "emu-snes", about = "SNES emulator", version)]
struct Cli {
    /// LoROM image to run.
    rom: PathBuf,

    /// Stop after this many frames. Runs until a fault if omitted.
    #[arg(long)]
    frames: Option<u64>,

    /// Use PAL timing (312 scanlines).
    #[arg(long)]
    pal: bool,

    /// Write wram.bin, vram.bin, cgram.bin and cpu.json here on exit.
    #[arg(long, value_name = "DIR")]
    dump_dir: Option<PathBuf>,

    /// Save the last rendered frame as a PNG on exit.
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match SnesConfig::from_file(&cli.rom) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if cli.pal {
        config.region = Region::Pal;
    }

    let mut snes = match Snes::new(&config) {
        Ok(snes) => snes,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut fault = None;
    while cli.frames.is_none_or(|limit| snes.frame_count() < limit) {
        if let Err(e) = snes.run_frame() {
            fault = Some(e);
            break;
        }
    }
    log::info!(
        "stopped after {} frames ({:.3} s emulated)",
        snes.frame_count(),
        snes.emulated_seconds()
    );

    eprint!("{}", dump::register_report(&snes));

    if let Some(ref dir) = cli.dump_dir {
        if let Err(e) = dump::write_dumps(&snes, dir) {
            eprintln!("Dump error: {e}");
        }
    }
    if let Some(ref path) = cli.screenshot {
        if let Err(e) = capture::save_screenshot(&snes, path) {
            eprintln!("Screenshot error: {e}");
        }
    }

    if let Some(fault) = fault {
        eprintln!("Fatal: {fault}");
        process::exit(1);
    }
}
