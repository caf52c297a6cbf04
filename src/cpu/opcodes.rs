// Opcode metadata table for the 6502 CPU
// Maps each of the 256 possible opcode bytes to its mnemonic, addressing
// mode, base cycle count and instruction length in bytes.

use crate::cpu::addressing::AddressingMode;

/// Static information about a single opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// Three-letter mnemonic, used by the disassembler/tracer.
    pub mnemonic: &'static str,
    /// Addressing mode used to compute the effective address.
    pub mode: AddressingMode,
    /// Base cycle count (no page-crossing penalty in this revision).
    pub cycles: u8,
    /// Instruction length in bytes, including the opcode byte.
    pub bytes: u8,
    /// Whether this opcode would take a page-crossing penalty on real
    /// hardware. Kept for disassembly fidelity; never added to `cycles`.
    pub page_cycle: bool,
}

const fn op(
    mnemonic: &'static str,
    mode: AddressingMode,
    cycles: u8,
    bytes: u8,
    page_cycle: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
        bytes,
        page_cycle,
    }
}

/// Placeholder used for the opcode bytes the 6502's official instruction
/// set does not define. Decoded as a one-byte, two-cycle no-op so `step`
/// never panics on unofficial opcodes.
const UNDEFINED: OpcodeInfo = op("???", AddressingMode::Implied, 2, 1, false);

use AddressingMode::{
    Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, IndexedIndirect, Indirect,
    IndirectIndexed, Relative, ZeroPage, ZeroPageX, ZeroPageY,
};

/// Dense 256-entry opcode table. 151 slots hold a defined 6502 instruction;
/// the rest hold [`UNDEFINED`].
pub static OPCODE_TABLE: [OpcodeInfo; 256] = {
    let mut table = [UNDEFINED; 256];

    // Load/Store
    table[0xA9] = op("LDA", Immediate, 2, 2, false);
    table[0xA5] = op("LDA", ZeroPage, 3, 2, false);
    table[0xB5] = op("LDA", ZeroPageX, 4, 2, false);
    table[0xAD] = op("LDA", Absolute, 4, 3, false);
    table[0xBD] = op("LDA", AbsoluteX, 4, 3, true);
    table[0xB9] = op("LDA", AbsoluteY, 4, 3, true);
    table[0xA1] = op("LDA", IndexedIndirect, 6, 2, false);
    table[0xB1] = op("LDA", IndirectIndexed, 5, 2, true);

    table[0xA2] = op("LDX", Immediate, 2, 2, false);
    table[0xA6] = op("LDX", ZeroPage, 3, 2, false);
    table[0xB6] = op("LDX", ZeroPageY, 4, 2, false);
    table[0xAE] = op("LDX", Absolute, 4, 3, false);
    table[0xBE] = op("LDX", AbsoluteY, 4, 3, true);

    table[0xA0] = op("LDY", Immediate, 2, 2, false);
    table[0xA4] = op("LDY", ZeroPage, 3, 2, false);
    table[0xB4] = op("LDY", ZeroPageX, 4, 2, false);
    table[0xAC] = op("LDY", Absolute, 4, 3, false);
    table[0xBC] = op("LDY", AbsoluteX, 4, 3, true);

    table[0x85] = op("STA", ZeroPage, 3, 2, false);
    table[0x95] = op("STA", ZeroPageX, 4, 2, false);
    table[0x8D] = op("STA", Absolute, 4, 3, false);
    table[0x9D] = op("STA", AbsoluteX, 5, 3, false);
    table[0x99] = op("STA", AbsoluteY, 5, 3, false);
    table[0x81] = op("STA", IndexedIndirect, 6, 2, false);
    table[0x91] = op("STA", IndirectIndexed, 6, 2, false);

    table[0x86] = op("STX", ZeroPage, 3, 2, false);
    table[0x96] = op("STX", ZeroPageY, 4, 2, false);
    table[0x8E] = op("STX", Absolute, 4, 3, false);

    table[0x84] = op("STY", ZeroPage, 3, 2, false);
    table[0x94] = op("STY", ZeroPageX, 4, 2, false);
    table[0x8C] = op("STY", Absolute, 4, 3, false);

    // Arithmetic
    table[0x69] = op("ADC", Immediate, 2, 2, false);
    table[0x65] = op("ADC", ZeroPage, 3, 2, false);
    table[0x75] = op("ADC", ZeroPageX, 4, 2, false);
    table[0x6D] = op("ADC", Absolute, 4, 3, false);
    table[0x7D] = op("ADC", AbsoluteX, 4, 3, true);
    table[0x79] = op("ADC", AbsoluteY, 4, 3, true);
    table[0x61] = op("ADC", IndexedIndirect, 6, 2, false);
    table[0x71] = op("ADC", IndirectIndexed, 5, 2, true);

    table[0xE9] = op("SBC", Immediate, 2, 2, false);
    table[0xE5] = op("SBC", ZeroPage, 3, 2, false);
    table[0xF5] = op("SBC", ZeroPageX, 4, 2, false);
    table[0xED] = op("SBC", Absolute, 4, 3, false);
    table[0xFD] = op("SBC", AbsoluteX, 4, 3, true);
    table[0xF9] = op("SBC", AbsoluteY, 4, 3, true);
    table[0xE1] = op("SBC", IndexedIndirect, 6, 2, false);
    table[0xF1] = op("SBC", IndirectIndexed, 5, 2, true);

    table[0xE6] = op("INC", ZeroPage, 5, 2, false);
    table[0xF6] = op("INC", ZeroPageX, 6, 2, false);
    table[0xEE] = op("INC", Absolute, 6, 3, false);
    table[0xFE] = op("INC", AbsoluteX, 7, 3, false);
    table[0xE8] = op("INX", Implied, 2, 1, false);
    table[0xC8] = op("INY", Implied, 2, 1, false);

    table[0xC6] = op("DEC", ZeroPage, 5, 2, false);
    table[0xD6] = op("DEC", ZeroPageX, 6, 2, false);
    table[0xCE] = op("DEC", Absolute, 6, 3, false);
    table[0xDE] = op("DEC", AbsoluteX, 7, 3, false);
    table[0xCA] = op("DEX", Implied, 2, 1, false);
    table[0x88] = op("DEY", Implied, 2, 1, false);

    // Logical
    table[0x29] = op("AND", Immediate, 2, 2, false);
    table[0x25] = op("AND", ZeroPage, 3, 2, false);
    table[0x35] = op("AND", ZeroPageX, 4, 2, false);
    table[0x2D] = op("AND", Absolute, 4, 3, false);
    table[0x3D] = op("AND", AbsoluteX, 4, 3, true);
    table[0x39] = op("AND", AbsoluteY, 4, 3, true);
    table[0x21] = op("AND", IndexedIndirect, 6, 2, false);
    table[0x31] = op("AND", IndirectIndexed, 5, 2, true);

    table[0x09] = op("ORA", Immediate, 2, 2, false);
    table[0x05] = op("ORA", ZeroPage, 3, 2, false);
    table[0x15] = op("ORA", ZeroPageX, 4, 2, false);
    table[0x0D] = op("ORA", Absolute, 4, 3, false);
    table[0x1D] = op("ORA", AbsoluteX, 4, 3, true);
    table[0x19] = op("ORA", AbsoluteY, 4, 3, true);
    table[0x01] = op("ORA", IndexedIndirect, 6, 2, false);
    table[0x11] = op("ORA", IndirectIndexed, 5, 2, true);

    table[0x49] = op("EOR", Immediate, 2, 2, false);
    table[0x45] = op("EOR", ZeroPage, 3, 2, false);
    table[0x55] = op("EOR", ZeroPageX, 4, 2, false);
    table[0x4D] = op("EOR", Absolute, 4, 3, false);
    table[0x5D] = op("EOR", AbsoluteX, 4, 3, true);
    table[0x59] = op("EOR", AbsoluteY, 4, 3, true);
    table[0x41] = op("EOR", IndexedIndirect, 6, 2, false);
    table[0x51] = op("EOR", IndirectIndexed, 5, 2, true);

    table[0x24] = op("BIT", ZeroPage, 3, 2, false);
    table[0x2C] = op("BIT", Absolute, 4, 3, false);

    // Shift/Rotate
    table[0x0A] = op("ASL", Accumulator, 2, 1, false);
    table[0x06] = op("ASL", ZeroPage, 5, 2, false);
    table[0x16] = op("ASL", ZeroPageX, 6, 2, false);
    table[0x0E] = op("ASL", Absolute, 6, 3, false);
    table[0x1E] = op("ASL", AbsoluteX, 7, 3, false);

    table[0x4A] = op("LSR", Accumulator, 2, 1, false);
    table[0x46] = op("LSR", ZeroPage, 5, 2, false);
    table[0x56] = op("LSR", ZeroPageX, 6, 2, false);
    table[0x4E] = op("LSR", Absolute, 6, 3, false);
    table[0x5E] = op("LSR", AbsoluteX, 7, 3, false);

    table[0x2A] = op("ROL", Accumulator, 2, 1, false);
    table[0x26] = op("ROL", ZeroPage, 5, 2, false);
    table[0x36] = op("ROL", ZeroPageX, 6, 2, false);
    table[0x2E] = op("ROL", Absolute, 6, 3, false);
    table[0x3E] = op("ROL", AbsoluteX, 7, 3, false);

    table[0x6A] = op("ROR", Accumulator, 2, 1, false);
    table[0x66] = op("ROR", ZeroPage, 5, 2, false);
    table[0x76] = op("ROR", ZeroPageX, 6, 2, false);
    table[0x6E] = op("ROR", Absolute, 6, 3, false);
    table[0x7E] = op("ROR", AbsoluteX, 7, 3, false);

    // Compare
    table[0xC9] = op("CMP", Immediate, 2, 2, false);
    table[0xC5] = op("CMP", ZeroPage, 3, 2, false);
    table[0xD5] = op("CMP", ZeroPageX, 4, 2, false);
    table[0xCD] = op("CMP", Absolute, 4, 3, false);
    table[0xDD] = op("CMP", AbsoluteX, 4, 3, true);
    table[0xD9] = op("CMP", AbsoluteY, 4, 3, true);
    table[0xC1] = op("CMP", IndexedIndirect, 6, 2, false);
    table[0xD1] = op("CMP", IndirectIndexed, 5, 2, true);

    table[0xE0] = op("CPX", Immediate, 2, 2, false);
    table[0xE4] = op("CPX", ZeroPage, 3, 2, false);
    table[0xEC] = op("CPX", Absolute, 4, 3, false);

    table[0xC0] = op("CPY", Immediate, 2, 2, false);
    table[0xC4] = op("CPY", ZeroPage, 3, 2, false);
    table[0xCC] = op("CPY", Absolute, 4, 3, false);

    // Branches
    table[0x90] = op("BCC", Relative, 2, 2, true);
    table[0xB0] = op("BCS", Relative, 2, 2, true);
    table[0xF0] = op("BEQ", Relative, 2, 2, true);
    table[0x30] = op("BMI", Relative, 2, 2, true);
    table[0xD0] = op("BNE", Relative, 2, 2, true);
    table[0x10] = op("BPL", Relative, 2, 2, true);
    table[0x50] = op("BVC", Relative, 2, 2, true);
    table[0x70] = op("BVS", Relative, 2, 2, true);

    // Jump/Subroutine
    table[0x4C] = op("JMP", Absolute, 3, 3, false);
    table[0x6C] = op("JMP", Indirect, 5, 3, false);
    table[0x20] = op("JSR", Absolute, 6, 3, false);
    table[0x60] = op("RTS", Implied, 6, 1, false);

    // Stack
    table[0x48] = op("PHA", Implied, 3, 1, false);
    table[0x68] = op("PLA", Implied, 4, 1, false);
    table[0x08] = op("PHP", Implied, 3, 1, false);
    table[0x28] = op("PLP", Implied, 4, 1, false);
    table[0x9A] = op("TXS", Implied, 2, 1, false);
    table[0xBA] = op("TSX", Implied, 2, 1, false);

    // Transfer
    table[0xAA] = op("TAX", Implied, 2, 1, false);
    table[0xA8] = op("TAY", Implied, 2, 1, false);
    table[0x8A] = op("TXA", Implied, 2, 1, false);
    table[0x98] = op("TYA", Implied, 2, 1, false);

    // Flags
    table[0x18] = op("CLC", Implied, 2, 1, false);
    table[0xD8] = op("CLD", Implied, 2, 1, false);
    table[0x58] = op("CLI", Implied, 2, 1, false);
    table[0xB8] = op("CLV", Implied, 2, 1, false);
    table[0x38] = op("SEC", Implied, 2, 1, false);
    table[0xF8] = op("SED", Implied, 2, 1, false);
    table[0x78] = op("SEI", Implied, 2, 1, false);

    // Miscellaneous
    table[0x00] = op("BRK", Implied, 7, 1, false);
    table[0x40] = op("RTI", Implied, 6, 1, false);
    table[0xEA] = op("NOP", Implied, 2, 1, false);

    table
};
