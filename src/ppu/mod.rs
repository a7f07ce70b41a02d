//! PPU (Picture Processing Unit) emulation for the NES.
//!
//! See [PPU registers](https://www.nesdev.org/wiki/PPU_registers) and
//! [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map). Models the
//! register file, 341-dot × 262-line timing, vblank NMI, nametable/palette
//! memory and a whole-frame background renderer.

pub mod palette;
pub mod ppu;
pub mod render;


pub use ppu::PPU;
