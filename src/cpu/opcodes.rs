//! The 256-entry opcode table.
//!
//! Built once when the CPU is constructed and read-only afterwards.
//! Every slot is either a populated [`Instruction`] or explicitly `None`;
//! decoding a `None` slot is a fatal [`CpuError::UnimplementedOpcode`].

use std::fmt;

use crate::cpu::{addressing::AddressingMode, cpu::CpuError};

/// Instruction handlers, one per mnemonic. The execute step dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stable unofficial opcodes.
    Lax,
    Sax,
    Dcp,
    Isc,
    Slo,
    Rla,
    Sre,
    Rra,
}

impl Mnemonic {
    /// Upper-case assembler name, e.g. `"LDA"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
            Self::Lax => "LAX",
            Self::Sax => "SAX",
            Self::Dcp => "DCP",
            Self::Isc => "ISC",
            Self::Slo => "SLO",
            Self::Rla => "RLA",
            Self::Sre => "SRE",
            Self::Rra => "RRA",
        }
    }

    /// Branches, jumps, returns and BRK set PC themselves.
    pub fn manages_pc(self) -> bool {
        matches!(
            self,
            Self::Bcc
                | Self::Bcs
                | Self::Beq
                | Self::Bmi
                | Self::Bne
                | Self::Bpl
                | Self::Bvc
                | Self::Bvs
                | Self::Jmp
                | Self::Jsr
                | Self::Rts
                | Self::Rti
                | Self::Brk
        )
    }

    /// Read-class instructions pay one extra cycle when indexing crosses a page.
    /// Stores and read-modify-write forms already include that cycle.
    pub fn page_cross_penalty(self) -> bool {
        matches!(
            self,
            Self::Adc
                | Self::And
                | Self::Cmp
                | Self::Eor
                | Self::Lda
                | Self::Ldx
                | Self::Ldy
                | Self::Ora
                | Self::Sbc
                | Self::Lax
                | Self::Nop
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded form of one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Total length including the opcode byte.
    pub bytes: u8,
    /// Base cycle count before page-cross and branch penalties.
    pub cycles: u8,
    /// When set, the handler owns PC and the driver must not add `bytes`.
    pub manages_pc: bool,
    /// Documented-but-unofficial opcode; shown with a `*` in traces.
    pub unofficial: bool,
}

impl Instruction {
    fn new(opcode: u8, mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Self {
        Self {
            opcode,
            mnemonic,
            mode,
            bytes: 1 + mode.operand_len(),
            cycles,
            manages_pc: mnemonic.manages_pc(),
            unofficial: false,
        }
    }
}

/// Immutable opcode byte → instruction lookup.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    slots: [Option<Instruction>; 256],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTable {
    pub fn new() -> Self {
        use AddressingMode::*;
        use Mnemonic::*;

        #[rustfmt::skip]
        const OFFICIAL: &[(u8, Mnemonic, AddressingMode, u8)] = &[
            (0x69, Adc, Immediate, 2), (0x65, Adc, ZeroPage, 3), (0x75, Adc, ZeroPageX, 4),
            (0x6D, Adc, Absolute, 4), (0x7D, Adc, AbsoluteX, 4), (0x79, Adc, AbsoluteY, 4),
            (0x61, Adc, IdxIndirect, 6), (0x71, Adc, IndirectIdx, 5),

            (0x29, And, Immediate, 2), (0x25, And, ZeroPage, 3), (0x35, And, ZeroPageX, 4),
            (0x2D, And, Absolute, 4), (0x3D, And, AbsoluteX, 4), (0x39, And, AbsoluteY, 4),
            (0x21, And, IdxIndirect, 6), (0x31, And, IndirectIdx, 5),

            (0x0A, Asl, Accumulator, 2), (0x06, Asl, ZeroPage, 5), (0x16, Asl, ZeroPageX, 6),
            (0x0E, Asl, Absolute, 6), (0x1E, Asl, AbsoluteX, 7),

            (0x90, Bcc, Relative, 2), (0xB0, Bcs, Relative, 2), (0xF0, Beq, Relative, 2),
            (0x30, Bmi, Relative, 2), (0xD0, Bne, Relative, 2), (0x10, Bpl, Relative, 2),
            (0x50, Bvc, Relative, 2), (0x70, Bvs, Relative, 2),

            (0x24, Bit, ZeroPage, 3), (0x2C, Bit, Absolute, 4),

            (0x00, Brk, Implied, 7),

            (0x18, Clc, Implied, 2), (0xD8, Cld, Implied, 2), (0x58, Cli, Implied, 2),
            (0xB8, Clv, Implied, 2), (0x38, Sec, Implied, 2), (0xF8, Sed, Implied, 2),
            (0x78, Sei, Implied, 2),

            (0xC9, Cmp, Immediate, 2), (0xC5, Cmp, ZeroPage, 3), (0xD5, Cmp, ZeroPageX, 4),
            (0xCD, Cmp, Absolute, 4), (0xDD, Cmp, AbsoluteX, 4), (0xD9, Cmp, AbsoluteY, 4),
            (0xC1, Cmp, IdxIndirect, 6), (0xD1, Cmp, IndirectIdx, 5),

            (0xE0, Cpx, Immediate, 2), (0xE4, Cpx, ZeroPage, 3), (0xEC, Cpx, Absolute, 4),
            (0xC0, Cpy, Immediate, 2), (0xC4, Cpy, ZeroPage, 3), (0xCC, Cpy, Absolute, 4),

            (0xC6, Dec, ZeroPage, 5), (0xD6, Dec, ZeroPageX, 6), (0xCE, Dec, Absolute, 6),
            (0xDE, Dec, AbsoluteX, 7),
            (0xCA, Dex, Implied, 2), (0x88, Dey, Implied, 2),

            (0x49, Eor, Immediate, 2), (0x45, Eor, ZeroPage, 3), (0x55, Eor, ZeroPageX, 4),
            (0x4D, Eor, Absolute, 4), (0x5D, Eor, AbsoluteX, 4), (0x59, Eor, AbsoluteY, 4),
            (0x41, Eor, IdxIndirect, 6), (0x51, Eor, IndirectIdx, 5),

            (0xE6, Inc, ZeroPage, 5), (0xF6, Inc, ZeroPageX, 6), (0xEE, Inc, Absolute, 6),
            (0xFE, Inc, AbsoluteX, 7),
            (0xE8, Inx, Implied, 2), (0xC8, Iny, Implied, 2),

            (0x4C, Jmp, Absolute, 3), (0x6C, Jmp, Indirect, 5),
            (0x20, Jsr, Absolute, 6),

            (0xA9, Lda, Immediate, 2), (0xA5, Lda, ZeroPage, 3), (0xB5, Lda, ZeroPageX, 4),
            (0xAD, Lda, Absolute, 4), (0xBD, Lda, AbsoluteX, 4), (0xB9, Lda, AbsoluteY, 4),
            (0xA1, Lda, IdxIndirect, 6), (0xB1, Lda, IndirectIdx, 5),

            (0xA2, Ldx, Immediate, 2), (0xA6, Ldx, ZeroPage, 3), (0xB6, Ldx, ZeroPageY, 4),
            (0xAE, Ldx, Absolute, 4), (0xBE, Ldx, AbsoluteY, 4),

            (0xA0, Ldy, Immediate, 2), (0xA4, Ldy, ZeroPage, 3), (0xB4, Ldy, ZeroPageX, 4),
            (0xAC, Ldy, Absolute, 4), (0xBC, Ldy, AbsoluteX, 4),

            (0x4A, Lsr, Accumulator, 2), (0x46, Lsr, ZeroPage, 5), (0x56, Lsr, ZeroPageX, 6),
            (0x4E, Lsr, Absolute, 6), (0x5E, Lsr, AbsoluteX, 7),

            (0xEA, Nop, Implied, 2),

            (0x09, Ora, Immediate, 2), (0x05, Ora, ZeroPage, 3), (0x15, Ora, ZeroPageX, 4),
            (0x0D, Ora, Absolute, 4), (0x1D, Ora, AbsoluteX, 4), (0x19, Ora, AbsoluteY, 4),
            (0x01, Ora, IdxIndirect, 6), (0x11, Ora, IndirectIdx, 5),

            (0x48, Pha, Implied, 3), (0x08, Php, Implied, 3), (0x68, Pla, Implied, 4),
            (0x28, Plp, Implied, 4),

            (0x2A, Rol, Accumulator, 2), (0x26, Rol, ZeroPage, 5), (0x36, Rol, ZeroPageX, 6),
            (0x2E, Rol, Absolute, 6), (0x3E, Rol, AbsoluteX, 7),

            (0x6A, Ror, Accumulator, 2), (0x66, Ror, ZeroPage, 5), (0x76, Ror, ZeroPageX, 6),
            (0x6E, Ror, Absolute, 6), (0x7E, Ror, AbsoluteX, 7),

            (0x40, Rti, Implied, 6), (0x60, Rts, Implied, 6),

            (0xE9, Sbc, Immediate, 2), (0xE5, Sbc, ZeroPage, 3), (0xF5, Sbc, ZeroPageX, 4),
            (0xED, Sbc, Absolute, 4), (0xFD, Sbc, AbsoluteX, 4), (0xF9, Sbc, AbsoluteY, 4),
            (0xE1, Sbc, IdxIndirect, 6), (0xF1, Sbc, IndirectIdx, 5),

            (0x85, Sta, ZeroPage, 3), (0x95, Sta, ZeroPageX, 4), (0x8D, Sta, Absolute, 4),
            (0x9D, Sta, AbsoluteX, 5), (0x99, Sta, AbsoluteY, 5), (0x81, Sta, IdxIndirect, 6),
            (0x91, Sta, IndirectIdx, 6),

            (0x86, Stx, ZeroPage, 3), (0x96, Stx, ZeroPageY, 4), (0x8E, Stx, Absolute, 4),
            (0x84, Sty, ZeroPage, 3), (0x94, Sty, ZeroPageX, 4), (0x8C, Sty, Absolute, 4),

            (0xAA, Tax, Implied, 2), (0xA8, Tay, Implied, 2), (0xBA, Tsx, Implied, 2),
            (0x8A, Txa, Implied, 2), (0x9A, Txs, Implied, 2), (0x98, Tya, Implied, 2),
        ];

        #[rustfmt::skip]
        const UNOFFICIAL: &[(u8, Mnemonic, AddressingMode, u8)] = &[
            (0x1A, Nop, Implied, 2), (0x3A, Nop, Implied, 2), (0x5A, Nop, Implied, 2),
            (0x7A, Nop, Implied, 2), (0xDA, Nop, Implied, 2), (0xFA, Nop, Implied, 2),
            (0x80, Nop, Immediate, 2), (0x82, Nop, Immediate, 2), (0x89, Nop, Immediate, 2),
            (0xC2, Nop, Immediate, 2), (0xE2, Nop, Immediate, 2),
            (0x04, Nop, ZeroPage, 3), (0x44, Nop, ZeroPage, 3), (0x64, Nop, ZeroPage, 3),
            (0x14, Nop, ZeroPageX, 4), (0x34, Nop, ZeroPageX, 4), (0x54, Nop, ZeroPageX, 4),
            (0x74, Nop, ZeroPageX, 4), (0xD4, Nop, ZeroPageX, 4), (0xF4, Nop, ZeroPageX, 4),
            (0x0C, Nop, Absolute, 4),
            (0x1C, Nop, AbsoluteX, 4), (0x3C, Nop, AbsoluteX, 4), (0x5C, Nop, AbsoluteX, 4),
            (0x7C, Nop, AbsoluteX, 4), (0xDC, Nop, AbsoluteX, 4), (0xFC, Nop, AbsoluteX, 4),

            (0xA7, Lax, ZeroPage, 3), (0xB7, Lax, ZeroPageY, 4), (0xAF, Lax, Absolute, 4),
            (0xBF, Lax, AbsoluteY, 4), (0xA3, Lax, IdxIndirect, 6), (0xB3, Lax, IndirectIdx, 5),

            (0x87, Sax, ZeroPage, 3), (0x97, Sax, ZeroPageY, 4), (0x8F, Sax, Absolute, 4),
            (0x83, Sax, IdxIndirect, 6),

            (0xEB, Sbc, Immediate, 2),

            (0xC7, Dcp, ZeroPage, 5), (0xD7, Dcp, ZeroPageX, 6), (0xCF, Dcp, Absolute, 6),
            (0xDF, Dcp, AbsoluteX, 7), (0xDB, Dcp, AbsoluteY, 7), (0xC3, Dcp, IdxIndirect, 8),
            (0xD3, Dcp, IndirectIdx, 8),

            (0xE7, Isc, ZeroPage, 5), (0xF7, Isc, ZeroPageX, 6), (0xEF, Isc, Absolute, 6),
            (0xFF, Isc, AbsoluteX, 7), (0xFB, Isc, AbsoluteY, 7), (0xE3, Isc, IdxIndirect, 8),
            (0xF3, Isc, IndirectIdx, 8),

            (0x07, Slo, ZeroPage, 5), (0x17, Slo, ZeroPageX, 6), (0x0F, Slo, Absolute, 6),
            (0x1F, Slo, AbsoluteX, 7), (0x1B, Slo, AbsoluteY, 7), (0x03, Slo, IdxIndirect, 8),
            (0x13, Slo, IndirectIdx, 8),

            (0x27, Rla, ZeroPage, 5), (0x37, Rla, ZeroPageX, 6), (0x2F, Rla, Absolute, 6),
            (0x3F, Rla, AbsoluteX, 7), (0x3B, Rla, AbsoluteY, 7), (0x23, Rla, IdxIndirect, 8),
            (0x33, Rla, IndirectIdx, 8),

            (0x47, Sre, ZeroPage, 5), (0x57, Sre, ZeroPageX, 6), (0x4F, Sre, Absolute, 6),
            (0x5F, Sre, AbsoluteX, 7), (0x5B, Sre, AbsoluteY, 7), (0x43, Sre, IdxIndirect, 8),
            (0x53, Sre, IndirectIdx, 8),

            (0x67, Rra, ZeroPage, 5), (0x77, Rra, ZeroPageX, 6), (0x6F, Rra, Absolute, 6),
            (0x7F, Rra, AbsoluteX, 7), (0x7B, Rra, AbsoluteY, 7), (0x63, Rra, IdxIndirect, 8),
            (0x73, Rra, IndirectIdx, 8),
        ];

        let mut slots = [None; 256];

        for &(opcode, mnemonic, mode, cycles) in OFFICIAL {
            slots[opcode as usize] = Some(Instruction::new(opcode, mnemonic, mode, cycles));
        }
        for &(opcode, mnemonic, mode, cycles) in UNOFFICIAL {
            slots[opcode as usize] = Some(Instruction {
                unofficial: true,
                ..Instruction::new(opcode, mnemonic, mode, cycles)
            });
        }

        Self { slots }
    }

    /// Look up `opcode`, if it is populated.
    pub fn get(&self, opcode: u8) -> Option<&Instruction> {
        self.slots[opcode as usize].as_ref()
    }

    /// Decode the opcode fetched at `pc`; unpopulated slots are fatal.
    pub fn decode(&self, opcode: u8, pc: u16) -> Result<&Instruction, CpuError> {
        self.get(opcode)
            .ok_or(CpuError::UnimplementedOpcode { opcode, pc })
    }
}
