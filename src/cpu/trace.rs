//! Per-instruction trace records in the nestest log layout.
//!
//! ```text
//! C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD CYC:7
//! ```

use std::fmt;

use crate::cpu::{addressing::AddressingMode, cpu::Registers, opcodes::Mnemonic};

/// Width of the disassembly column (mnemonic + operand), nestest style.
const DISASM_WIDTH: usize = 32;

/// State of the CPU immediately before an instruction executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLine {
    pub pc: u16,
    /// Raw instruction bytes; only the first `len` are meaningful.
    pub bytes: [u8; 3],
    pub len: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub unofficial: bool,
    pub registers: Registers,
    /// Cumulative CPU cycles before this instruction.
    pub cycles: usize,
}

impl TraceLine {
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// `" JMP $C5F5"`, `"*NOP $04"`, `" ASL A"`. The first column marks unofficial opcodes.
    pub fn disassembly(&self) -> String {
        let operands = &self.bytes[1..self.len as usize];
        let operand = self.mode.format_operand(operands, self.pc);
        let name = if self.unofficial {
            format!("*{}", self.mnemonic)
        } else {
            format!(" {}", self.mnemonic)
        };

        if operand.is_empty() {
            name
        } else {
            format!("{name} {operand}")
        }
    }
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.bytes[..self.len as usize]
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let r = &self.registers;

        write!(
            f,
            "{:04X}  {:<8} {:<width$} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            raw,
            self.disassembly(),
            r.a,
            r.x,
            r.y,
            r.status,
            r.sp,
            self.cycles,
            width = DISASM_WIDTH,
        )
    }
}
