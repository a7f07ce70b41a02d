//! NES cartridge loading.
//!
//! - **cartridge**: parses iNES (.nes) images into fixed PRG/CHR banks (NROM only).

pub mod cartridge;

pub use cartridge::{Cartridge, CartridgeError};
