//! End-to-end runs of the `emu-snes` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// 32 KiB LoROM that runs `code` from $00:8000.
fn write_rom(name: &str, code: &[u8]) -> PathBuf {
    let mut rom = vec![0xEA; 0x8000];
    rom[..code.len()].copy_from_slice(code);
    rom[0x7FFC] = 0x00;
    rom[0x7FFD] = 0x80;

    let dir = std::env::temp_dir().join(format!("emu-snes-cli-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("test.sfc");
    fs::write(&path, rom).expect("write ROM");
    path
}

fn emulator() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_emu-snes"));
    command.env("RUST_LOG", "error");
    command
}

#[test]
fn unmapped_bank_is_fatal() {
    // JML $FF:0000
    let rom = write_rom("fatal", &[0x5C, 0x00, 0x00, 0xFF]);

    let output = emulator().arg(&rom).output().expect("run emu-snes");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unmapped bank $FF"), "stderr: {stderr}");
    assert!(stderr.contains("PC: $FF:0000"), "stderr: {stderr}");

    fs::remove_dir_all(rom.parent().unwrap()).ok();
}

#[test]
fn unknown_opcode_is_fatal() {
    // WDM
    let rom = write_rom("opcode", &[0x42, 0x00]);

    let output = emulator().arg(&rom).output().expect("run emu-snes");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown opcode $42 at $00:8000"), "stderr: {stderr}");

    fs::remove_dir_all(rom.parent().unwrap()).ok();
}

#[test]
fn frame_limit_exits_cleanly_with_dumps() {
    // BRA *
    let rom = write_rom("dump", &[0x80, 0xFE]);
    let dump_dir = rom.parent().unwrap().join("dump");
    let screenshot = rom.parent().unwrap().join("frame.png");

    let output = emulator()
        .arg(&rom)
        .args(["--frames", "2", "--pal"])
        .arg("--dump-dir")
        .arg(&dump_dir)
        .arg("--screenshot")
        .arg(&screenshot)
        .output()
        .expect("run emu-snes");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(fs::read(dump_dir.join("wram.bin")).unwrap().len(), 128 * 1024);
    assert_eq!(fs::read(dump_dir.join("vram.bin")).unwrap().len(), 32 * 1024);
    assert_eq!(fs::read(dump_dir.join("cgram.bin")).unwrap().len(), 512);
    let json = fs::read_to_string(dump_dir.join("cpu.json")).unwrap();
    assert!(json.contains("\"pc\": 32768"));
    assert!(screenshot.exists());

    fs::remove_dir_all(rom.parent().unwrap()).ok();
}

#[test]
fn missing_rom_reports_error() {
    let output = emulator()
        .arg("/nonexistent/rom.sfc")
        .output()
        .expect("run emu-snes");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}
