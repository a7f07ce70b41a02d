//! Whole-frame background renderer.
//!
//! Runs once per vblank entry and redraws every pixel from the first
//! nametable, the attribute table and the pattern table half chosen by
//! PPUCTRL bit 4. No scrolling, no sprites.

use crate::ppu::{
    palette,
    ppu::{CTRL_BG_PATTERN_HIGH, PPU, SCREEN_WIDTH},
};

const TILES_WIDE: usize = 32;
const TILES_HIGH: usize = 30;
const ATTRIBUTE_TABLE: usize = 0x3C0;

impl PPU {
    pub fn render_frame(&mut self) {
        let pattern_base = if self.ctrl & CTRL_BG_PATTERN_HIGH != 0 {
            0x1000
        } else {
            0x0000
        };

        for row in 0..TILES_HIGH {
            for col in 0..TILES_WIDE {
                let tile = self.nametables[row * TILES_WIDE + col] as usize;
                let group = self.palette_group(row, col);
                self.draw_tile(pattern_base + tile * 16, group, row, col);
            }
        }
    }

    /// 2-bit palette group for a tile, from its 2×2 quadrant of the attribute byte.
    pub fn palette_group(&self, row: usize, col: usize) -> u8 {
        let attr = self.nametables[ATTRIBUTE_TABLE + (row / 4) * 8 + col / 4];
        let shift = ((row % 4) / 2) * 4 + ((col % 4) / 2) * 2;
        (attr >> shift) & 0x03
    }

    fn draw_tile(&mut self, tile_addr: usize, group: u8, row: usize, col: usize) {
        for y in 0..8 {
            let plane0 = self.pattern_tables[tile_addr + y];
            let plane1 = self.pattern_tables[tile_addr + y + 8];

            for x in 0..8 {
                let bit = 7 - x;
                let color_index = (((plane1 >> bit) & 1) << 1) | ((plane0 >> bit) & 1);

                // Index 0 is always the universal background colour.
                let entry = if color_index == 0 {
                    self.palette[0]
                } else {
                    self.palette[1 + (group as usize) * 4 + (color_index as usize - 1)]
                };

                let pixel = (row * 8 + y) * SCREEN_WIDTH + col * 8 + x;
                self.framebuffer[pixel] = palette::rgb(entry);
            }
        }
    }
}
