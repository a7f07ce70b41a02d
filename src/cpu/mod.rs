//! 6502 CPU emulation for the NES.
//!
//! Table-driven decode: the opcode byte indexes a 256-entry [`opcodes::OpcodeTable`],
//! the addressing mode resolves an operand, and the mnemonic selects the handler.
//! Official opcodes plus the stable unofficial ones (LAX, SAX, DCP, ISC, SLO, RLA,
//! SRE, RRA, multi-byte NOPs) are implemented; everything else halts the CPU.

pub mod addressing;
pub mod cpu;
pub mod flags;
pub mod opcodes;
pub mod trace;

#[cfg(test)]
mod tests;

pub use cpu::{CPU, CpuError, Registers};
pub use opcodes::{Instruction, Mnemonic, OpcodeTable};
pub use trace::TraceLine;
