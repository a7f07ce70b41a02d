//! Whole-system driver: CPU + bus + PPU + cartridge behind one handle.

use crate::{
    Error,
    bus::{Bus, NesBus},
    cartridge::Cartridge,
    config::Config,
    cpu::{CPU, CpuError, TraceLine, cpu::RESET_VECTOR},
    ppu::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
};

pub struct Nes {
    pub cpu: CPU<NesBus>,
}

impl Nes {
    /// Load the cartridge at `config.rom_path` and reset the system.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let cart = Cartridge::load(&config.rom_path)?;
        Ok(Self::from_cartridge(cart, config))
    }

    /// Reset the system around an already loaded cartridge.
    pub fn from_cartridge(cart: Cartridge, config: &Config) -> Self {
        let mut bus = NesBus::new(cart);
        bus.ppu.nmi_requires_enable = config.nmi_requires_enable;

        let mut cpu = CPU::new(bus);
        cpu.reset();
        log::info!("reset vector ${RESET_VECTOR:04X} -> ${:04X}", cpu.pc);

        if let Some(entry) = config.entry_point {
            cpu.pc = entry;
        }
        log::info!("starting at ${:04X}", cpu.pc);

        Self { cpu }
    }

    /// Execute one instruction. After a fault every call returns the same error.
    pub fn step(&mut self) -> Result<TraceLine, CpuError> {
        self.cpu.step()
    }

    /// Run until the PPU completes a frame. Returns the instructions executed.
    pub fn run_frame(&mut self) -> Result<usize, CpuError> {
        self.run_frame_with(|_| {})
    }

    /// Like [`Nes::run_frame`], handing every trace record to `on_step`.
    pub fn run_frame_with(
        &mut self,
        mut on_step: impl FnMut(&TraceLine),
    ) -> Result<usize, CpuError> {
        let mut executed = 0;
        while !self.cpu.bus.frame_ready() {
            let line = self.cpu.step()?;
            on_step(&line);
            executed += 1;
        }
        self.cpu.bus.clear_frame_ready();
        Ok(executed)
    }

    /// 256×240 0x00RRGGBB pixels from the last rendered frame.
    pub fn framebuffer(&self) -> &[u32] {
        &self.cpu.bus.ppu.framebuffer
    }

    pub fn frame_count(&self) -> u64 {
        self.cpu.bus.ppu.frame_count
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted()
    }

    /// Direct bus read, e.g. for result bytes test ROMs leave in RAM.
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.cpu.bus.read(addr)
    }

    pub const fn screen_size() -> (usize, usize) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
