// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Output image composition
//!
//! ```text
//! +--------------------------------------+ 800×600
//! |   GPU display area, nearest-scaled   |
//! |   to fit and centered                |
//! |   +------------------------------+   |
//! |   | overlay: 64×32 cells of      |   |
//! |   | 12×18 px (768×576, centered) |   |
//! |   +------------------------------+   |
//! +--------------------------------------+
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{rgb555_to_rgba, GlyphAtlas};
use crate::core::console::{Console, COLUMNS, ROWS};
use crate::core::error::Result;
use crate::core::gpu::{ColorDepth, GPU};

/// Composed RGBA8 output image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Output width
    pub const WIDTH: usize = 800;

    /// Output height
    pub const HEIGHT: usize = 600;

    /// Overlay cell width on screen
    pub const CELL_WIDTH: usize = 12;

    /// Overlay cell height on screen
    pub const CELL_HEIGHT: usize = 18;

    /// Opaque black image
    pub fn new() -> Self {
        let mut pixels = vec![0u8; Self::WIDTH * Self::HEIGHT * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 0xFF;
        }
        Self { pixels }
    }

    /// Compose the current picture and overlay
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::console::Console;
    /// use xsp::core::display::{Framebuffer, GlyphAtlas};
    /// use xsp::core::GPU;
    ///
    /// let gpu = GPU::new();
    /// let frame = Framebuffer::compose(&gpu, &Console::new(), &GlyphAtlas::builtin());
    /// assert_eq!(frame.as_bytes().len(), 800 * 600 * 4);
    /// ```
    pub fn compose(gpu: &GPU, console: &Console, atlas: &GlyphAtlas) -> Self {
        let mut frame = Self::new();
        if !gpu.is_display_disabled() {
            frame.draw_display(gpu);
        }
        frame.draw_overlay(console, atlas);
        frame
    }

    /// Blit the display area with nearest-neighbour scaling
    fn draw_display(&mut self, gpu: &GPU) {
        let area = gpu.display_area();
        let (src_w, src_h) = (area.width as usize, area.height as usize);
        if src_w == 0 || src_h == 0 {
            return;
        }

        // Largest fit that keeps the aspect ratio
        let (dst_w, dst_h) = if Self::WIDTH * src_h <= Self::HEIGHT * src_w {
            (Self::WIDTH, src_h * Self::WIDTH / src_w)
        } else {
            (src_w * Self::HEIGHT / src_h, Self::HEIGHT)
        };
        let left = (Self::WIDTH - dst_w) / 2;
        let top = (Self::HEIGHT - dst_h) / 2;
        let depth = gpu.display_mode().color_depth();

        for dy in 0..dst_h {
            let sy = dy * src_h / dst_h;
            let vy = (area.y as usize + sy) % GPU::VRAM_HEIGHT;
            for dx in 0..dst_w {
                let sx = dx * src_w / dst_w;
                let rgba = match depth {
                    ColorDepth::C15Bit => {
                        let vx = (area.x as usize + sx) % GPU::VRAM_WIDTH;
                        rgb555_to_rgba(gpu.read_vram(vx as u16, vy as u16))
                    }
                    ColorDepth::C24Bit => Self::fetch_24bit(gpu, area.x as usize, vy, sx),
                };
                self.set_pixel(left + dx, top + dy, rgba);
            }
        }
    }

    /// 24-bit pixels are packed bytes running across 16-bit VRAM words
    fn fetch_24bit(gpu: &GPU, start_x: usize, vy: usize, sx: usize) -> [u8; 4] {
        let base = start_x * 2 + sx * 3;
        let byte = |offset: usize| {
            let b = base + offset;
            let word = gpu.read_vram(((b / 2) % GPU::VRAM_WIDTH) as u16, vy as u16);
            (word >> ((b & 1) * 8)) as u8
        };
        [byte(0), byte(1), byte(2), 0xFF]
    }

    /// Draw non-empty console cells over the picture
    fn draw_overlay(&mut self, console: &Console, atlas: &GlyphAtlas) {
        let left = (Self::WIDTH - COLUMNS * Self::CELL_WIDTH) / 2;
        let top = (Self::HEIGHT - ROWS * Self::CELL_HEIGHT) / 2;

        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let cell = console.cell(col, row);
                if cell.glyph == 0 {
                    continue;
                }
                let fg = rgb555_to_rgba(cell.fg);
                let bg = (cell.bg != 0).then(|| rgb555_to_rgba(cell.bg));
                let x0 = left + col * Self::CELL_WIDTH;
                let y0 = top + row * Self::CELL_HEIGHT;

                for cy in 0..Self::CELL_HEIGHT {
                    let gy = cy * GlyphAtlas::GLYPH_SIZE / Self::CELL_HEIGHT;
                    for cx in 0..Self::CELL_WIDTH {
                        let gx = cx * GlyphAtlas::GLYPH_SIZE / Self::CELL_WIDTH;
                        if atlas.is_set(cell.glyph, gx, gy) {
                            self.set_pixel(x0 + cx, y0 + cy, fg);
                        } else if let Some(bg) = bg {
                            self.set_pixel(x0 + cx, y0 + cy, bg);
                        }
                    }
                }
            }
        }
    }

    #[inline(always)]
    fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * Self::WIDTH + x) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// RGBA value at (`x`, `y`)
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * Self::WIDTH + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Raw RGBA8 bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Write the raw RGBA8 bytes to a file
    pub fn write_raw<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.pixels)?;
        Ok(())
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
