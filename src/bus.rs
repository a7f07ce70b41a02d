//! Memory bus and address decoding for the NES.
//!
//! Maps CPU addresses to RAM, PPU registers, the APU/IO window and the
//! cartridge, and forwards PPU dots so NMI can be delivered mid-instruction.

use crate::{cartridge::Cartridge, ppu::PPU};

/// Memory-mapped access used by the CPU. Timing hooks default to no-ops so
/// plain memory buses (tests, tools) only implement `read`/`write`.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Advance attached video hardware by one PPU dot.
    fn tick_dot(&mut self) {}

    /// Take a pending NMI, if one was raised since the last poll.
    fn poll_nmi(&mut self) -> bool {
        false
    }
}

const RAM_LEN: usize = 0x0800;
const APU_IO_LEN: usize = 0x20;

/// Main NES bus: RAM, PPU, APU/IO registers and cartridge.
pub struct NesBus {
    pub ram: [u8; RAM_LEN],
    /// $4000–$401F: stored so reads see the last write; no sound or input behind it.
    pub apu_io: [u8; APU_IO_LEN],
    pub cart: Cartridge,
    pub ppu: PPU,
    frame_ready: bool,
}

impl NesBus {
    /// Create a bus around `cart`; CHR is copied into the PPU pattern tables.
    pub fn new(cart: Cartridge) -> Self {
        let mut ppu = PPU::new();
        ppu.load_chr(cart.chr_rom());

        Self {
            ram: [0; RAM_LEN],
            apu_io: [0; APU_IO_LEN],
            cart,
            ppu,
            frame_ready: false,
        }
    }

    /// True once a frame has completed and has not been presented yet.
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Clear after presenting so the next completed frame can set it.
    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // 2 KiB work RAM, repeated through $1FFF
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // PPU decodes only the low three address bits
            0x2000..=0x3FFF => self.ppu.read_register(addr),
            0x4000..=0x401F => self.apu_io[(addr - 0x4000) as usize],
            // Expansion / SRAM: unmapped on NROM
            0x4020..=0x7FFF => 0,
            0x8000..=0xFFFF => self.cart.read_prg(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            0x2000..=0x3FFF => self.ppu.write_register(addr, data),
            0x4000..=0x401F => self.apu_io[(addr - 0x4000) as usize] = data,
            // Expansion and ROM ignore writes
            0x4020..=0xFFFF => {}
        }
    }

    fn tick_dot(&mut self) {
        self.ppu.tick();
        if self.ppu.frame_ready {
            self.frame_ready = true;
        }
    }

    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.ppu.nmi)
    }
}
