//! Run-time configuration shared by the library driver and the binary.

use std::path::PathBuf;

/// How to load and run a cartridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rom_path: PathBuf,
    /// Start here instead of the reset vector ($C000 for automated nestest).
    pub entry_point: Option<u16>,
    /// Print one trace line per instruction to stdout.
    pub trace: bool,
    /// Gate the vblank NMI on PPUCTRL bit 7 like real hardware.
    /// Off by default: one NMI per frame regardless of PPUCTRL.
    pub nmi_requires_enable: bool,
    /// Headless: run this many frames and exit.
    pub frames: Option<u64>,
    pub scale: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rom_path: PathBuf::from("test/nestest.nes"),
            entry_point: None,
            trace: false,
            nmi_requires_enable: false,
            frames: None,
            scale: 2,
        }
    }
}

impl Config {
    pub fn new(rom_path: impl Into<PathBuf>) -> Self {
        Self {
            rom_path: rom_path.into(),
            ..Self::default()
        }
    }
}

/// Parse a CPU address given as `C000`, `$C000` or `0xC000`.
pub fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {s:?}: {e}"))
}
