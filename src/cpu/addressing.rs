//! 6502 addressing modes and effective-address resolution.
//!
//! Resolvers read operand bytes relative to the opcode's own address
//! (`pc + 1`, `pc + 2`) and never move PC; the driver adds the instruction
//! length afterwards unless the handler owns control flow.

use crate::{bus::Bus, cpu::cpu::CPU};

/// The 13 operand-locating schemes of the 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    /// `($nn,X)`: X is added to the zero-page pointer before dereferencing.
    IdxIndirect,
    /// `($nn),Y`: Y is added to the dereferenced 16-bit address.
    IndirectIdx,
}

/// Where an instruction's operand lives once its addressing mode is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand (implied instructions).
    None,
    /// The accumulator register itself; no memory access.
    Accumulator,
    /// An effective bus address.
    Address(u16),
    /// Signed branch displacement, relative to the byte after the branch.
    Offset(i8),
}

/// Result of resolving an addressing mode for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    /// True when an indexed address landed on a different page than its base.
    pub page_crossed: bool,
}

impl Resolved {
    fn at(addr: u16) -> Self {
        Self {
            operand: Operand::Address(addr),
            page_crossed: false,
        }
    }

    fn indexed(base: u16, addr: u16) -> Self {
        Self {
            operand: Operand::Address(addr),
            page_crossed: (base & 0xFF00) != (addr & 0xFF00),
        }
    }
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IdxIndirect
            | Self::IndirectIdx => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// Format the operand the way reference trace logs and disassemblers do.
    /// `operands` holds the bytes after the opcode; `pc` is the opcode address.
    pub fn format_operand(self, operands: &[u8], pc: u16) -> String {
        let b0 = operands.first().copied().unwrap_or(0);
        let b1 = operands.get(1).copied().unwrap_or(0);
        let word = u16::from_le_bytes([b0, b1]);

        match self {
            Self::Implied => String::new(),
            Self::Accumulator => "A".to_string(),
            Self::Immediate => format!("#${b0:02X}"),
            Self::ZeroPage => format!("${b0:02X}"),
            Self::ZeroPageX => format!("${b0:02X},X"),
            Self::ZeroPageY => format!("${b0:02X},Y"),
            Self::Relative => {
                let target = pc.wrapping_add(2).wrapping_add(b0 as i8 as u16);
                format!("${target:04X}")
            }
            Self::Absolute => format!("${word:04X}"),
            Self::AbsoluteX => format!("${word:04X},X"),
            Self::AbsoluteY => format!("${word:04X},Y"),
            Self::Indirect => format!("(${word:04X})"),
            Self::IdxIndirect => format!("(${b0:02X},X)"),
            Self::IndirectIdx => format!("(${b0:02X}),Y"),
        }
    }
}

impl<B: Bus> CPU<B> {
    /// Resolve `mode` for the instruction whose opcode sits at `self.pc`.
    pub fn resolve(&mut self, mode: AddressingMode) -> Resolved {
        let pc = self.pc;

        match mode {
            AddressingMode::Implied => Resolved {
                operand: Operand::None,
                page_crossed: false,
            },
            AddressingMode::Accumulator => Resolved {
                operand: Operand::Accumulator,
                page_crossed: false,
            },
            AddressingMode::Immediate => Resolved::at(pc.wrapping_add(1)),
            AddressingMode::ZeroPage => Resolved::at(self.operand_byte() as u16),
            AddressingMode::ZeroPageX => {
                Resolved::at(self.operand_byte().wrapping_add(self.x) as u16)
            }
            AddressingMode::ZeroPageY => {
                Resolved::at(self.operand_byte().wrapping_add(self.y) as u16)
            }
            AddressingMode::Relative => Resolved {
                operand: Operand::Offset(self.operand_byte() as i8),
                page_crossed: false,
            },
            AddressingMode::Absolute => Resolved::at(self.operand_word()),
            AddressingMode::AbsoluteX => {
                let base = self.operand_word();
                Resolved::indexed(base, base.wrapping_add(self.x as u16))
            }
            AddressingMode::AbsoluteY => {
                let base = self.operand_word();
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
            AddressingMode::Indirect => {
                let ptr = self.operand_word();
                // The high byte never carries into the next page: ($02FF) reads $02FF/$0200.
                let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let lo = self.bus.read(ptr) as u16;
                let hi = self.bus.read(hi_ptr) as u16;
                Resolved::at((hi << 8) | lo)
            }
            AddressingMode::IdxIndirect => {
                let zp = self.operand_byte().wrapping_add(self.x);
                Resolved::at(self.read_zero_page_word(zp))
            }
            AddressingMode::IndirectIdx => {
                let zp = self.operand_byte();
                let base = self.read_zero_page_word(zp);
                Resolved::indexed(base, base.wrapping_add(self.y as u16))
            }
        }
    }

    fn operand_byte(&mut self) -> u8 {
        self.bus.read(self.pc.wrapping_add(1))
    }

    fn operand_word(&mut self) -> u16 {
        let lo = self.bus.read(self.pc.wrapping_add(1)) as u16;
        let hi = self.bus.read(self.pc.wrapping_add(2)) as u16;
        (hi << 8) | lo
    }

    /// Little-endian pointer read that stays inside zero page ($FF wraps to $00).
    fn read_zero_page_word(&mut self, zp: u8) -> u16 {
        let lo = self.bus.read(zp as u16) as u16;
        let hi = self.bus.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }
}
