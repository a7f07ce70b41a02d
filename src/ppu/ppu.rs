//! NES PPU register file, VRAM and dot/scanline timing.
//!
//! Handles the eight CPU-visible registers at $2000–$2007 (mirrored), the
//! PPUADDR/PPUSCROLL write toggle, pattern/nametable/palette memory, and the
//! 341×262 timing that raises vblank and NMI. Background rendering lives in
//! `render.rs` and runs once per vblank entry.

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const VBLANK_SCANLINE: u16 = 241;
pub const PRE_RENDER_SCANLINE: u16 = 261;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

/// PPUCTRL bit 2: VRAM increment 32 (down) instead of 1 (across).
pub const CTRL_INCREMENT_32: u8 = 0x04;
/// PPUCTRL bit 4: background pattern table at $1000.
pub const CTRL_BG_PATTERN_HIGH: u8 = 0x10;
/// PPUCTRL bit 7: generate NMI at vblank.
pub const CTRL_NMI_ENABLE: u8 = 0x80;

/// PPUSTATUS bit 7: in vblank.
pub const STATUS_VBLANK: u8 = 0x80;

const PATTERN_TABLE_LEN: usize = 0x2000;
const NAMETABLE_LEN: usize = 0x800;
const PALETTE_LEN: usize = 32;

/// PPU state: registers, timing, VRAM, palette and the 256×240 framebuffer.
pub struct PPU {
    /// Dot within the current scanline, 0..341.
    pub dot: u16,
    /// Current scanline, 0..262.
    pub scanline: u16,
    pub ctrl: u8,
    pub mask: u8,
    pub status: u8,
    pub oam_addr: u8,
    /// OAMDATA pass-through latch; sprites are not rendered.
    pub oam_data: u8,
    pub scroll_x: u8,
    pub scroll_y: u8,
    /// Live VRAM address used by PPUDATA (14 bits).
    pub vram_addr: u16,
    /// Pending address assembled by the two PPUADDR writes.
    pub temp_vram_addr: u16,
    /// Shared PPUADDR/PPUSCROLL write toggle; false = next write is the first.
    pub write_toggle: bool,
    /// Pattern tables $0000–$1FFF, filled from cartridge CHR and read-only afterwards.
    pub pattern_tables: [u8; PATTERN_TABLE_LEN],
    /// 2 KiB of nametable RAM behind the 4 KiB $2000–$2FFF window.
    pub nametables: [u8; NAMETABLE_LEN],
    /// Palette RAM $3F00–$3F1F.
    pub palette: [u8; PALETTE_LEN],
    /// NMI raised at vblank entry, waiting for the CPU to take it.
    pub nmi: bool,
    /// Only raise NMI when PPUCTRL bit 7 is set.
    pub nmi_requires_enable: bool,
    /// True only on the tick that completed a frame.
    pub frame_ready: bool,
    pub frame_count: u64,
    /// 256×240 framebuffer (0x00RRGGBB), row-major.
    pub framebuffer: [u32; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    /// Fresh PPU at scanline 0, dot 0 with all memory cleared.
    pub fn new() -> Self {
        Self {
            dot: 0,
            scanline: 0,
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            oam_data: 0,
            scroll_x: 0,
            scroll_y: 0,
            vram_addr: 0,
            temp_vram_addr: 0,
            write_toggle: false,
            pattern_tables: [0; PATTERN_TABLE_LEN],
            nametables: [0; NAMETABLE_LEN],
            palette: [0; PALETTE_LEN],
            nmi: false,
            nmi_requires_enable: false,
            frame_ready: false,
            frame_count: 0,
            framebuffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Copy CHR into the pattern tables. Only the first 8 KiB is visible.
    pub fn load_chr(&mut self, chr: &[u8]) {
        let len = chr.len().min(PATTERN_TABLE_LEN);
        self.pattern_tables[..len].copy_from_slice(&chr[..len]);
    }

    /// Advance one dot. Entering scanline 241 sets vblank, raises NMI and
    /// renders the frame; entering 261 clears vblank; finishing 261 ends the frame.
    pub fn tick(&mut self) {
        self.frame_ready = false;

        self.dot += 1;
        if self.dot < DOTS_PER_SCANLINE {
            return;
        }

        self.dot = 0;
        self.scanline += 1;

        match self.scanline {
            VBLANK_SCANLINE => self.enter_vblank(),
            PRE_RENDER_SCANLINE => self.status &= !STATUS_VBLANK,
            SCANLINES_PER_FRAME => {
                self.scanline = 0;
                self.frame_ready = true;
                self.frame_count += 1;
            }
            _ => {}
        }
    }

    fn enter_vblank(&mut self) {
        self.status |= STATUS_VBLANK;
        if !self.nmi_requires_enable || self.ctrl & CTRL_NMI_ENABLE != 0 {
            self.nmi = true;
        }
        self.render_frame();
    }

    /// CPU read of $2000–$3FFF; `addr` is reduced to its register number.
    /// Write-only registers read back as 0.
    pub fn read_register(&mut self, addr: u16) -> u8 {
        match addr & 0x0007 {
            2 => self.read_status(),
            4 => self.oam_data,
            7 => self.read_data(),
            _ => 0,
        }
    }

    /// CPU write of $2000–$3FFF; `addr` is reduced to its register number.
    pub fn write_register(&mut self, addr: u16, data: u8) {
        match addr & 0x0007 {
            0 => self.ctrl = data,
            1 => self.mask = data,
            2 => {} // PPUSTATUS is read-only
            3 => self.oam_addr = data,
            4 => self.oam_data = data,
            5 => self.write_scroll(data),
            6 => self.write_addr(data),
            _ => self.write_data(data),
        }
    }

    /// Read PPUSTATUS ($2002); clears vblank and the write toggle.
    pub fn read_status(&mut self) -> u8 {
        let status = self.status & 0xE0;
        self.status &= !STATUS_VBLANK;
        self.write_toggle = false;
        status
    }

    /// Write PPUSCROLL ($2005): X then Y. Stored, not applied to rendering.
    pub fn write_scroll(&mut self, data: u8) {
        if !self.write_toggle {
            self.scroll_x = data;
        } else {
            self.scroll_y = data;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// Write PPUADDR ($2006): high 6 bits, then low 8 bits which commit the address.
    pub fn write_addr(&mut self, data: u8) {
        if !self.write_toggle {
            self.temp_vram_addr = (self.temp_vram_addr & 0x00FF) | (((data & 0x3F) as u16) << 8);
            self.write_toggle = true;
        } else {
            self.temp_vram_addr = (self.temp_vram_addr & 0xFF00) | data as u16;
            self.vram_addr = self.temp_vram_addr;
            self.write_toggle = false;
        }
    }

    /// Read PPUDATA ($2007). Unbuffered: returns the byte at the live address.
    pub fn read_data(&mut self) -> u8 {
        let data = self.vram_read(self.vram_addr);
        self.increment_vram_addr();
        data
    }

    /// Write PPUDATA ($2007), then auto-increment.
    pub fn write_data(&mut self, data: u8) {
        self.vram_write(self.vram_addr, data);
        self.increment_vram_addr();
    }

    fn increment_vram_addr(&mut self) {
        let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.vram_addr = self.vram_addr.wrapping_add(step) & 0x3FFF;
    }

    /// Read PPU address space ($0000–$3FFF, mirrored above).
    pub fn vram_read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.pattern_tables[addr as usize],
            0x2000..=0x3EFF => self.nametables[Self::nametable_index(addr)],
            _ => self.palette[Self::palette_index(addr)],
        }
    }

    /// Write PPU address space. Pattern tables are cartridge ROM and ignore writes.
    pub fn vram_write(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {}
            0x2000..=0x3EFF => self.nametables[Self::nametable_index(addr)] = data,
            _ => self.palette[Self::palette_index(addr)] = data & 0x3F,
        }
    }

    /// Fold $2000–$3EFF onto 2 KiB with vertical mirroring:
    /// $3000 mirrors $2000, $2800 mirrors $2000 and $2C00 mirrors $2400.
    pub fn nametable_index(addr: u16) -> usize {
        let addr = if addr >= 0x3000 { addr - 0x1000 } else { addr };
        ((addr - 0x2000) & 0x07FF) as usize
    }

    /// Resolve $3F00–$3FFF to a 32-byte palette index.
    /// $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C.
    pub fn palette_index(addr: u16) -> usize {
        let i = (addr & 0x1F) as usize;
        match i {
            0x10 | 0x14 | 0x18 | 0x1C => i - 0x10,
            _ => i,
        }
    }
}
