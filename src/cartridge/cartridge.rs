//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the subset of [iNES](https://www.nesdev.org/wiki/INES) a fixed
//! NROM board needs: 16-byte header (byte 4 = PRG size in 16 KiB units,
//! byte 5 = CHR size in 8 KiB units, byte 6 bit 2 = 512-byte trainer present),
//! then PRG ROM, then CHR ROM. No bank switching.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 16 * 1024;
const CHR_BANK_LEN: usize = 8 * 1024;
const MAGIC: &[u8; 4] = b"NES\x1A";

/// Byte 6 bit 2: a 512-byte trainer sits between the header and PRG.
const FLAG6_TRAINER: u8 = 0x04;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ROM image truncated: header declares {expected} bytes, file has {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unsupported PRG ROM size {0} bytes (expected 16 KiB or 32 KiB)")]
    UnsupportedPrgSize(usize),
}

/// Cartridge: PRG ROM mapped at $8000–$FFFF and CHR handed to the PPU.
/// Both are immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Build from raw banks. PRG must be exactly 16 KiB (mirrored) or 32 KiB.
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>) -> Result<Self, CartridgeError> {
        match prg_rom.len() {
            PRG_BANK_LEN | 0x8000 => Ok(Self { prg_rom, chr_rom }),
            len => Err(CartridgeError::UnsupportedPrgSize(len)),
        }
    }

    /// Read and parse an iNES file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        log::info!("loading {}", path.display());
        Self::from_ines(&data)
    }

    /// Parse an in-memory iNES image.
    pub fn from_ines(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        if &data[0..4] != MAGIC {
            log::warn!("missing NES\\x1A magic, trusting header anyway");
        }

        let prg_len = data[4] as usize * PRG_BANK_LEN;
        let chr_len = data[5] as usize * CHR_BANK_LEN;
        let has_trainer = data[6] & FLAG6_TRAINER != 0;
        let mapper = (data[6] >> 4) | (data[7] & 0xF0);
        if mapper != 0 {
            log::warn!("mapper {mapper} not supported, treating cartridge as NROM");
        }

        let prg_start = HEADER_LEN + if has_trainer { TRAINER_LEN } else { 0 };
        let chr_start = prg_start + prg_len;
        let end = chr_start + chr_len;
        if data.len() < end {
            return Err(CartridgeError::Truncated {
                expected: end,
                actual: data.len(),
            });
        }

        let prg_rom = data[prg_start..chr_start].to_vec();
        let chr_rom = data[chr_start..end].to_vec();
        if chr_rom.len() > CHR_BANK_LEN {
            log::warn!(
                "{} KiB of CHR, only the first 8 KiB is mapped",
                chr_rom.len() / 1024
            );
        }

        log::info!(
            "cartridge: {} KiB PRG, {} KiB CHR{}",
            prg_rom.len() / 1024,
            chr_rom.len() / 1024,
            if has_trainer { ", trainer skipped" } else { "" }
        );

        Self::new(prg_rom, chr_rom)
    }

    /// CPU read in $8000–$FFFF. 16 KiB images repeat in $C000–$FFFF.
    pub fn read_prg(&self, addr: u16) -> u8 {
        let offset = (addr as usize).wrapping_sub(0x8000) % self.prg_rom.len();
        self.prg_rom[offset]
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }
}
