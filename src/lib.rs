//! Famicore: a 6502 CPU and NES PPU core.
//!
//! Implements the NES chipset subset documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide) that a
//! background-only NROM game needs.
//!
//! ## Modules (NESdev references)
//!
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU, APU/IO
//!   window, cartridge; 3 PPU dots per CPU cycle with NMI polled after every dot
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading, [NROM](https://www.nesdev.org/wiki/NROM) only
//! - **config** – run-time options for the driver and the binary
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: official + stable undocumented opcodes, [NMI](https://www.nesdev.org/wiki/NMI), nestest-style trace
//! - **nes** – system driver: step, run a frame, expose the framebuffer
//! - **ppu** – [PPU registers](https://www.nesdev.org/wiki/PPU_registers), nametables, palette, 256×240 background

use thiserror::Error;

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod nes;
pub mod ppu;

pub use cartridge::{Cartridge, CartridgeError};
pub use config::Config;
pub use cpu::CpuError;
pub use nes::Nes;

/// Anything that can stop the emulator.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    #[error(transparent)]
    Cpu(#[from] CpuError),
}
