// Emulator module - Main emulator coordinator
//
// Owns the CPU and bus, loads cartridges, and drives the fetch-decode-execute
// loop against the PPU at the NES's fixed 1:3 CPU:PPU clock ratio.

mod config;

pub use config::EmulatorConfig;

use crate::bus::Bus;
use crate::cartridge::{Cartridge, INesError};
use crate::cpu::Cpu;
use std::path::{Path, PathBuf};

/// Main emulator structure
///
/// Coordinates the CPU and bus and provides the high-level run/reset surface
/// a host binary drives a frame at a time.
pub struct Emulator {
    /// CPU (6502 processor)
    cpu: Cpu,

    /// Bus (RAM, PPU, controller ports, cartridge mapper)
    bus: Bus,

    /// Configuration
    config: EmulatorConfig,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,

    /// Paused state
    paused: bool,
}

impl Emulator {
    /// Create a new emulator instance, initialized to power-on state with no
    /// cartridge loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let emulator = Emulator::new();
    /// ```
    pub fn new() -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            config: EmulatorConfig::default(),
            rom_path: None,
            paused: false,
        }
    }

    /// Load a ROM file, install its mapper on the bus, and reset.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom("game.nes").expect("failed to load ROM");
    /// ```
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EmulatorError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.bus
            .load_cartridge(cartridge)
            .map_err(EmulatorError::Mapper)?;
        self.rom_path = Some(path.to_path_buf());
        self.reset();
        Ok(())
    }

    /// Reset the emulator to power-on state, as if pressing the reset button.
    /// The currently loaded cartridge (if any) stays installed.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.paused = false;
    }

    /// Run a single CPU instruction, ticking the PPU three times per CPU
    /// cycle consumed. Returns the number of CPU cycles the instruction took.
    ///
    /// NMI delivery into the running program is intentionally not wired here:
    /// the PPU's vblank flag is observable via register reads, but nothing
    /// calls back into `Cpu::nmi`.
    pub fn step_instruction(&mut self) -> u8 {
        let cycles = self.cpu.step(&mut self.bus);
        for _ in 0..(cycles as u32 * 3) {
            self.bus.ppu_mut().step();
        }
        cycles
    }

    /// Run CPU instructions until the PPU reports a completed frame.
    pub fn step_frame(&mut self) {
        loop {
            let cycles = self.cpu.step(&mut self.bus);
            let mut frame_done = false;
            for _ in 0..(cycles as u32 * 3) {
                if self.bus.ppu_mut().step() {
                    frame_done = true;
                }
            }
            if frame_done {
                break;
            }
        }
    }

    /// Pause the emulator.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the emulator.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Whether the emulator is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reference to the CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Reference to the bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Reference to configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Mutable reference to configuration.
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// The currently loaded ROM path, if any.
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Error loading a ROM into the emulator.
#[derive(Debug)]
pub enum EmulatorError {
    /// The iNES file was malformed or named an unsupported mapper.
    Rom(INesError),
    /// The header's mapper number parsed fine but mapper construction failed
    /// (currently unreachable for mapper 0, kept for parity with `Bus::load_cartridge`'s
    /// fallible signature).
    Mapper(crate::cartridge::mappers::MapperError),
}

impl std::fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmulatorError::Rom(e) => write!(f, "{e}"),
            EmulatorError::Mapper(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EmulatorError {}

impl From<INesError> for EmulatorError {
    fn from(e: INesError) -> Self {
        EmulatorError::Rom(e)
    }
}
