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

//! GP0 rectangle commands (0x60-0x7F)
//!
//! ```text
//! Word 0:  CCBBGGRR    command + color
//! Word 1:  YYYYXXXX    top-left vertex
//! [Word 2: CLUTVVUU]   texcoord + CLUT (textured)
//! [Word 3: HHHHWWWW]   size (variable-size only)
//! ```
//!
//! Rectangles use the texture page from the current draw mode and are never
//! rotated; the draw mode flip bits mirror the texture instead.

use super::super::packet::RectFlags;
use super::super::primitives::{Color, TexCoord, TextureInfo, Vertex};
use super::super::render::Texture;
use super::super::GPU;

impl GPU {
    /// Decode and draw a rectangle packet
    pub(in crate::core::gpu) fn gp0_rectangle(&mut self, flags: RectFlags, words: &[u32]) {
        let color = if flags.textured && flags.raw_texture {
            Color::NEUTRAL
        } else {
            Color::from_u32(words[0])
        };
        let origin = Vertex::from_u32(words[1]).offset(self.draw_offset.0, self.draw_offset.1);

        let mut cursor = 2;
        let texture = if flags.textured {
            let word = words[cursor];
            cursor += 1;
            let texcoord = TexCoord::from_u32(word);
            let texpage = (self.draw_mode.status_bits() & 0x1FF) as u16;
            let texture = Texture {
                info: TextureInfo::from_attributes((word >> 16) as u16, texpage),
                window: self.texture_window,
                raw: flags.raw_texture,
            };
            Some((texture, (texcoord.u, texcoord.v)))
        } else {
            None
        };

        let size = match flags.size.fixed() {
            Some(size) => size,
            None => {
                let word = words[cursor];
                ((word & 0x3FF) as u16, ((word >> 16) & 0x1FF) as u16)
            }
        };

        let blend = if flags.semi_transparent {
            Some(self.draw_mode.blending())
        } else {
            None
        };

        log::trace!(
            "GP0 rectangle ({}, {}) {}×{} textured={}",
            origin.x,
            origin.y,
            size.0,
            size.1,
            flags.textured
        );

        self.rasterizer.draw_rectangle(
            &mut self.vram,
            (origin.x as i32, origin.y as i32),
            size,
            color,
            texture.as_ref().map(|(tex, uv)| (tex, *uv)),
            (self.draw_mode.texture_x_flip, self.draw_mode.texture_y_flip),
            blend,
        );
    }
}
