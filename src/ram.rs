// RAM module - CPU internal RAM implementation
//
// This module implements the 2KB internal RAM for the NES CPU with proper mirroring.
// The RAM is located in the CPU address space at $0000-$07FF and is mirrored three times
// at $0800-$0FFF, $1000-$17FF, and $1800-$1FFF.
//
// # Memory Layout
//
// ```text
// $0000-$07FF: 2KB internal RAM (actual physical memory)
// $0800-$0FFF: Mirror of $0000-$07FF
// $1000-$17FF: Mirror of $0000-$07FF
// $1800-$1FFF: Mirror of $0000-$07FF
// ```
//
// # Zero Page and Stack
//
// - Zero Page: $0000-$00FF - Fast access memory area with special addressing modes
// - Stack: $0100-$01FF - Hardware stack used by the 6502 processor

use crate::bus::MemoryMappedDevice;

/// Size of the internal RAM in bytes (2KB)
const RAM_SIZE: usize = 2048; // 2KB = 2048 bytes = 0x0800 bytes

/// Mask for RAM address mirroring
///
/// The NES has 2KB of RAM but it's mapped to 8KB of address space.
/// Using AND with 0x07FF (2047) ensures addresses $0000-$1FFF all map to the same 2KB.
const RAM_MIRROR_MASK: u16 = 0x07FF;

/// CPU internal RAM (2KB with mirroring)
///
/// The RAM struct represents the NES's 2KB of internal RAM. It automatically handles
/// address mirroring so that any address in the range $0000-$1FFF maps to the actual
/// 2KB physical memory.
///
/// # Mirroring Behavior
///
/// The hardware mirrors the 2KB RAM across a 8KB address space ($0000-$1FFF).
/// This means:
/// - Writing to $0000 is the same as writing to $0800, $1000, or $1800
/// - Reading from $0100 returns the same value as $0900, $1100, or $1900
///
/// # Initialization
///
/// RAM can be initialized with a specific fill pattern. On real NES hardware, RAM
/// contains semi-random patterns at power-on. For deterministic emulation, we
/// default to 0xFF, but other patterns like 0x00 can be used.
///
/// # Examples
///
/// ```
/// use nes_rs::ram::Ram;
/// use nes_rs::bus::MemoryMappedDevice;
///
/// // Create RAM initialized to 0xFF
/// let mut ram = Ram::new();
///
/// // Write to base address
/// ram.write(0x0000, 0x42);
///
/// // Read from mirrored address - returns the same value
/// assert_eq!(ram.read(0x0800), 0x42);
/// assert_eq!(ram.read(0x1000), 0x42);
/// assert_eq!(ram.read(0x1800), 0x42);
/// ```
#[derive(Clone)]
pub struct Ram {
    /// Internal 2KB memory array
    ///
    /// This is the actual physical memory. All addresses in the range $0000-$1FFF
    /// map to this 2KB array through mirroring.
    memory: [u8; RAM_SIZE],
}

impl Ram {
    /// Create a new RAM instance initialized with 0xFF
    ///
    /// Initializes all 2KB of RAM to 0xFF, which is a common pattern for testing
    /// and provides deterministic behavior. On real hardware, RAM contains
    /// semi-random values at power-on.
    ///
    /// # Returns
    ///
    /// A new Ram instance with all bytes set to 0xFF
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let ram = Ram::new();
    /// assert_eq!(ram.read(0x0000), 0xFF); // Default initialization
    /// ```
    pub fn new() -> Self {
        Ram {
            memory: [0xFF; RAM_SIZE],
        }
    }

    /// Create a new RAM instance initialized with zeros
    ///
    /// Initializes all 2KB of RAM to 0x00. This can be useful for testing or
    /// debugging scenarios where you want a clean slate.
    ///
    /// # Returns
    ///
    /// A new Ram instance with all bytes set to 0x00
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let ram = Ram::with_zeros();
    /// assert_eq!(ram.read(0x0000), 0x00);
    /// ```
    pub fn with_zeros() -> Self {
        Ram {
            memory: [0x00; RAM_SIZE],
        }
    }

    /// Create a new RAM instance with a custom fill pattern
    ///
    /// Initializes all 2KB of RAM to a specified byte value.
    ///
    /// # Arguments
    ///
    /// * `fill_byte` - The byte value to fill the RAM with
    ///
    /// # Returns
    ///
    /// A new Ram instance with all bytes set to the specified value
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let ram = Ram::with_pattern(0xAA);
    /// assert_eq!(ram.read(0x0000), 0xAA);
    /// assert_eq!(ram.read(0x07FF), 0xAA);
    /// ```
    pub fn with_pattern(fill_byte: u8) -> Self {
        Ram {
            memory: [fill_byte; RAM_SIZE],
        }
    }

    /// Reset RAM to power-on state (all bytes set to 0xFF)
    ///
    /// Resets all 2KB of RAM to 0xFF, simulating a power cycle.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let mut ram = Ram::with_zeros();
    /// ram.write(0x0000, 0x42);
    /// ram.reset();
    /// assert_eq!(ram.read(0x0000), 0xFF); // Back to power-on state
    /// ```
    pub fn reset(&mut self) {
        self.memory.fill(0xFF);
    }

    /// Get the size of RAM in bytes
    ///
    /// # Returns
    ///
    /// The size of RAM (always 2048 bytes for NES)
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    ///
    /// let ram = Ram::new();
    /// assert_eq!(ram.size(), 2048);
    /// ```
    pub const fn size(&self) -> usize {
        RAM_SIZE
    }

    /// Apply mirroring to an address
    ///
    /// Converts any address in the range $0000-$1FFF to the corresponding
    /// physical address in the 2KB RAM ($0000-$07FF).
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to mirror (typically $0000-$1FFF)
    ///
    /// # Returns
    ///
    /// The mirrored address within the 2KB range ($0000-$07FF)
    ///
    /// # Implementation Note
    ///
    /// Uses bitwise AND with 0x07FF to efficiently handle mirroring:
    /// - $0000 & 0x07FF = $0000
    /// - $0800 & 0x07FF = $0000
    /// - $1000 & 0x07FF = $0000
    /// - $1800 & 0x07FF = $0000
    /// - $0123 & 0x07FF = $0123
    /// - $0923 & 0x07FF = $0123
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    ///
    /// let ram = Ram::new();
    /// assert_eq!(ram.mirror_address(0x0000), 0x0000);
    /// assert_eq!(ram.mirror_address(0x0800), 0x0000);
    /// assert_eq!(ram.mirror_address(0x1000), 0x0000);
    /// assert_eq!(ram.mirror_address(0x1800), 0x0000);
    /// assert_eq!(ram.mirror_address(0x0123), 0x0123);
    /// assert_eq!(ram.mirror_address(0x1923), 0x0123);
    /// ```
    #[inline]
    pub const fn mirror_address(&self, addr: u16) -> u16 {
        addr & RAM_MIRROR_MASK
    }
}

impl MemoryMappedDevice for Ram {
    /// Read a byte from RAM
    ///
    /// Reads a byte from the RAM at the specified address. The address is automatically
    /// mirrored to the 2KB range, so any address in $0000-$1FFF is valid.
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to read from (will be mirrored to $0000-$07FF)
    ///
    /// # Returns
    ///
    /// The byte value at the mirrored address
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let mut ram = Ram::new();
    /// ram.write(0x0000, 0x42);
    ///
    /// // All mirrored addresses return the same value
    /// assert_eq!(ram.read(0x0000), 0x42);
    /// assert_eq!(ram.read(0x0800), 0x42);
    /// assert_eq!(ram.read(0x1000), 0x42);
    /// assert_eq!(ram.read(0x1800), 0x42);
    /// ```
    fn read(&mut self, addr: u16) -> u8 {
        let mirrored_addr = self.mirror_address(addr) as usize;
        self.memory[mirrored_addr]
    }

    /// Write a byte to RAM
    ///
    /// Writes a byte to the RAM at the specified address. The address is automatically
    /// mirrored to the 2KB range, so writing to any address in $0000-$1FFF affects
    /// the same physical memory location.
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to write to (will be mirrored to $0000-$07FF)
    /// * `data` - The byte value to write
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::ram::Ram;
    /// use nes_rs::bus::MemoryMappedDevice;
    ///
    /// let mut ram = Ram::new();
    ///
    /// // Write to a mirrored address
    /// ram.write(0x0800, 0x42);
    ///
    /// // Read from base address - gets the same value
    /// assert_eq!(ram.read(0x0000), 0x42);
    /// ```
    fn write(&mut self, addr: u16, data: u8) {
        let mirrored_addr = self.mirror_address(addr) as usize;
        self.memory[mirrored_addr] = data;
    }
}

impl Default for Ram {
    /// Create a default RAM instance
    ///
    /// Equivalent to `Ram::new()` - creates RAM initialized with 0xFF.
    fn default() -> Self {
        Self::new()
    }
}
