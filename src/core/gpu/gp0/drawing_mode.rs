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

//! GP0 Drawing Mode Commands
//!
//! # Commands
//!
//! - 0xE1: Draw Mode Setting (texture page, transparency, dithering, etc.)
//! - 0xE2: Texture Window Setting
//! - 0xE3: Set Drawing Area Top-Left
//! - 0xE4: Set Drawing Area Bottom-Right
//! - 0xE5: Set Drawing Offset
//! - 0xE6: Mask Bit Setting
//!
//! # References
//!
//! - [PSX-SPX: GP0 Drawing Settings](http://problemkaputt.de/psx-spx.htm#gpurenderattributes)

use super::super::primitives::sign_extend_11;
use super::super::registers::{DrawMode, TextureWindow};
use super::super::GPU;

impl GPU {
    /// GP0(E1h): Draw Mode Setting
    ///
    /// Bits 0-10 are mirrored into GPUSTAT, bit 11 (texture disable) into
    /// GPUSTAT bit 15. Bits 12-13 flip textured rectangles.
    pub(in crate::core::gpu) fn gp0_draw_mode(&mut self, word: u32) {
        self.draw_mode = DrawMode::from_bits(word);
        log::debug!(
            "Draw mode: page=({}, {}) depth={} semi={} tex_disable={}",
            self.draw_mode.texture_page_x_base as u16 * 64,
            self.draw_mode.texture_page_y_base as u16 * 256,
            self.draw_mode.texture_depth,
            self.draw_mode.semi_transparency,
            self.draw_mode.texture_disable
        );
    }

    /// GP0(E2h): Texture Window Setting
    pub(in crate::core::gpu) fn gp0_texture_window(&mut self, word: u32) {
        self.texture_window = TextureWindow::from_bits(word);
        log::debug!("Texture window: {:?}", self.texture_window);
    }

    /// GP0(E3h): Drawing Area Top-Left (X bits 0-9, Y bits 10-18)
    pub(in crate::core::gpu) fn gp0_draw_area_top_left(&mut self, word: u32) {
        self.draw_area.left = (word & 0x3FF) as u16;
        self.draw_area.top = ((word >> 10) & 0x1FF) as u16;
        self.update_rasterizer_clip_rect();
        log::debug!(
            "Drawing area top-left: ({}, {})",
            self.draw_area.left,
            self.draw_area.top
        );
    }

    /// GP0(E4h): Drawing Area Bottom-Right (X bits 0-9, Y bits 10-18)
    pub(in crate::core::gpu) fn gp0_draw_area_bottom_right(&mut self, word: u32) {
        self.draw_area.right = (word & 0x3FF) as u16;
        self.draw_area.bottom = ((word >> 10) & 0x1FF) as u16;
        self.update_rasterizer_clip_rect();
        log::debug!(
            "Drawing area bottom-right: ({}, {})",
            self.draw_area.right,
            self.draw_area.bottom
        );
    }

    /// GP0(E5h): Drawing Offset (signed 11-bit X bits 0-10, Y bits 11-21)
    pub(in crate::core::gpu) fn gp0_draw_offset(&mut self, word: u32) {
        let x = sign_extend_11((word & 0x7FF) as u16);
        let y = sign_extend_11(((word >> 11) & 0x7FF) as u16);
        self.draw_offset = (x, y);
        log::debug!("Drawing offset: ({}, {})", x, y);
    }

    /// GP0(E6h): Mask Bit Setting
    ///
    /// Bit 0 forces bit 15 on every written pixel; bit 1 protects pixels
    /// whose bit 15 is already set.
    pub(in crate::core::gpu) fn gp0_mask_settings(&mut self, word: u32) {
        let set_mask = word & 1 != 0;
        let check_mask = word & 2 != 0;
        self.rasterizer.set_mask_settings(set_mask, check_mask);
        log::debug!("Mask settings: set={} check={}", set_mask, check_mask);
    }
}
