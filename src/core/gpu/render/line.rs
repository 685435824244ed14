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

//! Line rasterization
//!
//! Lines use Bresenham's algorithm. Gouraud lines interpolate the color
//! along the major axis.

use super::super::primitives::{Color, SemiTransparency};
use super::rasterizer::{Rasterizer, ShadedVertex};

impl Rasterizer {
    /// Draw a line segment including both endpoints
    ///
    /// Segments longer than 1023 pixels horizontally or 511 vertically are
    /// not drawn.
    pub fn draw_line(
        &self,
        vram: &mut [u16],
        start: ShadedVertex,
        end: ShadedVertex,
        blend: Option<SemiTransparency>,
    ) {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        if dx > 1023 || dy > 511 {
            log::trace!("Dropping oversized line ({}x{})", dx, dy);
            return;
        }

        let sx = if start.x < end.x { 1 } else { -1 };
        let sy = if start.y < end.y { 1 } else { -1 };
        let steps = dx.max(dy).max(1);

        let mut x = start.x;
        let mut y = start.y;
        let mut err = dx - dy;

        for step in 0..=dx.max(dy) {
            let color = lerp_color(start.color, end.color, step, steps);
            self.put_pixel(vram, x, y, color.to_rgb15(), blend);

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }
}

fn lerp_color(a: Color, b: Color, step: i32, steps: i32) -> Color {
    let lerp = |from: u8, to: u8| -> u8 {
        (from as i32 + (to as i32 - from as i32) * step / steps) as u8
    };
    Color {
        r: lerp(a.r, b.r),
        g: lerp(a.g, b.g),
        b: lerp(a.b, b.b),
    }
}
