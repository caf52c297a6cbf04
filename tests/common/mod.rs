// Common test utilities for ROM-based integration tests
//
// Shared by the #[ignore]-gated Blargg-style test-ROM suites (CPU timing,
// instruction correctness, sprite/PPU behavior). Not run by default; invoke
// with `cargo test <name> -- --ignored --nocapture` once the referenced
// test ROMs are present under tests/nes-test-rom/.

#![allow(dead_code)]

use nes_rs::{Bus, Cartridge, Cpu, Mirroring};
use std::fs;
use std::path::Path;

/// Load a ROM file and return its PRG-ROM bytes (iNES header stripped).
pub fn load_rom(path: &Path) -> Result<Vec<u8>, String> {
    let rom_data =
        fs::read(path).map_err(|e| format!("failed to load ROM from {}: {}", path.display(), e))?;

    if rom_data.len() < 16 {
        return Err("ROM file too small (missing iNES header)".to_string());
    }

    let prg_rom_banks = rom_data[4] as usize;
    let prg_rom_size = prg_rom_banks * 16384;

    if rom_data.len() < 16 + prg_rom_size {
        return Err("ROM file too small for declared PRG-ROM size".to_string());
    }

    Ok(rom_data[16..16 + prg_rom_size].to_vec())
}

/// Read a null-terminated ASCII string out of bus memory.
pub fn read_string(bus: &mut Bus, addr: u16, max_len: usize) -> String {
    let mut result = String::new();
    let mut current_addr = addr;

    for _ in 0..max_len {
        let byte = bus.read(current_addr);
        if byte == 0 {
            break;
        }
        if (0x20..=0x7E).contains(&byte) {
            result.push(byte as char);
        }
        current_addr = current_addr.wrapping_add(1);
    }

    result
}

/// Run a Blargg-style test ROM to completion and report pass/fail.
///
/// These ROMs signal status through memory-mapped convention at $6000:
/// 0x80 while the test is running, 0x81 if a reset is requested, and
/// otherwise a final result code (0x00 = passed, nonzero = failed) with
/// a human-readable message as a null-terminated ASCII string at $6004.
pub fn run_blargg_style_test(rom_path: &str, max_cycles: u64) -> Result<(bool, String), String> {
    let path = Path::new(rom_path);
    if !path.exists() {
        return Err(format!("test ROM not found: {}", rom_path));
    }

    let prg_rom = load_rom(path)?;
    if prg_rom.len() != 16 * 1024 && prg_rom.len() != 32 * 1024 {
        return Err(format!(
            "unsupported PRG-ROM size for mapper 0: {} bytes",
            prg_rom.len()
        ));
    }

    let cartridge = Cartridge {
        prg_rom,
        chr_rom: vec![0u8; 8 * 1024],
        trainer: None,
        mapper: 0,
        mirroring: Mirroring::Horizontal,
        has_battery: false,
    };

    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    bus.load_cartridge(cartridge)
        .map_err(|e| format!("failed to install mapper: {}", e))?;
    cpu.reset(&mut bus);

    let mut started = false;
    let mut cycles = 0u64;

    while cycles < max_cycles {
        cpu.step(&mut bus);
        cycles = cpu.cycles;

        let status = bus.read(0x6000);
        if status == 0x80 {
            started = true;
            continue;
        }
        if started && status != 0x81 {
            let message = read_string(&mut bus, 0x6004, 400);
            return Ok((status == 0x00, message));
        }
    }

    Err(format!("test timed out after {} cycles", max_cycles))
}
