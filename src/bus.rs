// Bus module - Memory bus implementation
//
// This module implements the main memory bus that connects the CPU to all memory-mapped
// components in the NES system. It handles address routing, memory mirroring, and
// owns the RAM, PPU, controller ports, and (once a ROM is loaded) the cartridge mapper.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4015: APU registers (stubbed; audio is out of scope)
// $4016-$4017: Controller 1 / Controller 2
// $4018-$401F: APU and I/O test functionality (usually disabled)
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, and mapper registers)
// ```

use crate::cartridge::mappers::{self, MapperError};
use crate::cartridge::{Cartridge, Mapper};
use crate::input::ControllerIO;
use crate::ppu::Ppu;
use std::cell::RefCell;
use std::rc::Rc;

/// Trait for memory-mapped components
///
/// This trait defines the interface for components that can be mapped into the
/// CPU's address space. Components implementing this trait can handle read and
/// write operations for their specific memory ranges.
///
/// # Examples
///
/// PPU, RAM, and the controller ports all implement this trait to provide their
/// memory-mapped register interfaces.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Takes `&mut self` because several devices (PPU status, controller shift
    /// registers) change state as a side effect of being read.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    fn write(&mut self, addr: u16, data: u8);
}

/// Main memory bus structure
///
/// The Bus connects the CPU to all memory-mapped components in the NES system.
/// It owns RAM, the PPU, and the controller ports directly, and holds a
/// reference-counted handle to the cartridge mapper once a ROM is loaded (the
/// PPU holds the same handle, so both sides of the chip see the same mapper
/// state for CHR banking and mirroring).
pub struct Bus {
    /// Internal RAM: 2KB, mirrored 3 times across $0000-$1FFF.
    ram: crate::ram::Ram,

    /// Picture Processing Unit, mapped at $2000-$3FFF.
    ppu: Ppu,

    /// Controller ports, mapped at $4016-$4017.
    controller: ControllerIO,

    /// Cartridge mapper, once a ROM has been loaded. `None` before that point;
    /// reads from cartridge space return open bus (0) and writes are ignored.
    mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,
}

impl Bus {
    /// Create a new bus instance with zero-initialized RAM and no cartridge loaded.
    ///
    /// # Example
    /// ```
    /// use nes_rs::Bus;
    /// let bus = Bus::new();
    /// ```
    pub fn new() -> Self {
        Bus {
            ram: crate::ram::Ram::with_zeros(),
            ppu: Ppu::new(),
            controller: ControllerIO::new(),
            mapper: None,
        }
    }

    /// Parse and install a cartridge, wiring its mapper into both the bus
    /// (for PRG-ROM/PRG-RAM access) and the PPU (for CHR access and mirroring).
    ///
    /// # Errors
    /// Returns `MapperError` if the cartridge's mapper number isn't implemented.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), MapperError> {
        let mapper = mappers::create_mapper(cartridge)?;
        let mapper = Rc::new(RefCell::new(mapper));
        self.ppu.set_mapper(mapper.clone());
        self.mapper = Some(mapper);
        Ok(())
    }

    /// Whether a cartridge mapper is currently installed.
    pub fn has_cartridge(&self) -> bool {
        self.mapper.is_some()
    }

    /// Immutable access to the PPU (frame buffer, register snapshots for debugging).
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Mutable access to the PPU (stepping, reset).
    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// Mutable access to the controller ports, for applying input state.
    pub fn controller_mut(&mut self) -> &mut ControllerIO {
        &mut self.controller
    }

    /// Read a byte from the bus
    ///
    /// Routes the read operation to the appropriate memory region or device
    /// based on the address. Handles mirroring for RAM and PPU registers.
    ///
    /// # Memory Regions
    ///
    /// - $0000-$1FFF: Internal RAM (2KB) with mirroring
    /// - $2000-$3FFF: PPU registers (8 bytes) with mirroring
    /// - $4000-$4015: APU registers (stubbed, returns open bus)
    /// - $4016-$4017: Controller 1 / Controller 2
    /// - $4018-$401F: APU/I/O test mode (open bus)
    /// - $4020-$FFFF: Cartridge space, routed to the installed mapper
    ///
    /// # Example
    /// ```
    /// use nes_rs::Bus;
    /// let mut bus = Bus::new();
    /// let value = bus.read(0x0000); // Read from RAM
    /// ```
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.read(addr),
            0x2000..=0x3FFF => self.ppu.read(addr),
            0x4016 | 0x4017 => self.controller.read(addr),
            0x4000..=0x4015 => 0,
            0x4018..=0x401F => 0,
            0x4020..=0xFFFF => match &self.mapper {
                Some(mapper) => mapper.borrow().cpu_read(addr),
                None => 0,
            },
        }
    }

    /// Write a byte to the bus
    ///
    /// Routes the write operation to the appropriate memory region or device
    /// based on the address. Handles mirroring for RAM and PPU registers.
    ///
    /// # Example
    /// ```
    /// use nes_rs::Bus;
    /// let mut bus = Bus::new();
    /// bus.write(0x0000, 0x42); // Write to RAM
    /// ```
    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, data),
            0x2000..=0x3FFF => self.ppu.write(addr, data),
            0x4016 | 0x4017 => self.controller.write(addr, data),
            0x4000..=0x4015 => {}
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(mapper) = &self.mapper {
                    mapper.borrow_mut().cpu_write(addr, data);
                }
            }
        }
    }

    /// Read a 16-bit word from the bus (little-endian)
    ///
    /// # Example
    /// ```
    /// use nes_rs::Bus;
    /// let mut bus = Bus::new();
    /// bus.write(0x0000, 0x34);
    /// bus.write(0x0001, 0x12);
    /// assert_eq!(bus.read_u16(0x0000), 0x1234);
    /// ```
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Write a 16-bit word to the bus (little-endian)
    ///
    /// # Example
    /// ```
    /// use nes_rs::Bus;
    /// let mut bus = Bus::new();
    /// bus.write_u16(0x0000, 0x1234);
    /// assert_eq!(bus.read(0x0000), 0x34);
    /// assert_eq!(bus.read(0x0001), 0x12);
    /// ```
    pub fn write_u16(&mut self, addr: u16, data: u16) {
        let lo = (data & 0xFF) as u8;
        let hi = (data >> 8) as u8;
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
