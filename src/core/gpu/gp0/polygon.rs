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

//! GP0 polygon commands (0x20-0x3F)
//!
//! Triangles and quads, flat or Gouraud shaded, optionally textured.
//!
//! # Packet layout
//!
//! ```text
//! Word 0:  CCBBGGRR           command + color of vertex 0
//! Per vertex i:
//!   [BBGGRR]                  color i (shaded, i > 0)
//!   YYYYXXXX                  position i
//!   [ATTRVVUU]                texcoord i (textured); ATTR is the CLUT for
//!                             i = 0 and the texture page for i = 1
//! ```
//!
//! Quads are drawn as the triangles (v0, v1, v2) and (v1, v2, v3).

use super::super::packet::PolygonFlags;
use super::super::primitives::{Color, SemiTransparency, TexCoord, TextureInfo, Vertex};
use super::super::render::{ShadedVertex, Texture};
use super::super::GPU;

impl GPU {
    /// Decode and draw a polygon packet
    pub(in crate::core::gpu) fn gp0_polygon(&mut self, flags: PolygonFlags, words: &[u32]) {
        let count = flags.vertex_count();
        let mut vertices = [ShadedVertex::default(); 4];
        let mut clut = 0u16;
        let mut texpage = 0u16;

        let base_color = Color::from_u32(words[0]);
        let mut cursor = 1;
        for (i, vertex) in vertices.iter_mut().enumerate().take(count) {
            let color = if flags.shaded && i > 0 {
                cursor += 1;
                Color::from_u32(words[cursor - 1])
            } else {
                base_color
            };

            let position = Vertex::from_u32(words[cursor]).offset(self.draw_offset.0, self.draw_offset.1);
            cursor += 1;

            let mut texcoord = TexCoord::default();
            if flags.textured {
                let word = words[cursor];
                cursor += 1;
                texcoord = TexCoord::from_u32(word);
                match i {
                    0 => clut = (word >> 16) as u16,
                    1 => texpage = (word >> 16) as u16,
                    _ => {}
                }
            }

            *vertex = ShadedVertex {
                x: position.x as i32,
                y: position.y as i32,
                color: if flags.textured && flags.raw_texture {
                    Color::NEUTRAL
                } else {
                    color
                },
                u: texcoord.u,
                v: texcoord.v,
            };
        }

        let texture = if flags.textured {
            self.draw_mode.apply_texpage(texpage);
            Some(Texture {
                info: TextureInfo::from_attributes(clut, texpage),
                window: self.texture_window,
                raw: flags.raw_texture,
            })
        } else {
            None
        };

        let blend: Option<SemiTransparency> = if flags.semi_transparent {
            Some(self.draw_mode.blending())
        } else {
            None
        };

        log::trace!(
            "GP0 polygon {:?}: {:?}",
            flags,
            &vertices[..count]
        );

        self.rasterizer.draw_triangle(
            &mut self.vram,
            [vertices[0], vertices[1], vertices[2]],
            texture.as_ref(),
            blend,
        );
        if flags.quad {
            self.rasterizer.draw_triangle(
                &mut self.vram,
                [vertices[1], vertices[2], vertices[3]],
                texture.as_ref(),
                blend,
            );
        }
    }
}
