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

//! Software rasterizer
//!
//! Triangles are filled with edge functions over their bounding box, clipped
//! to the drawing area. Colors and texture coordinates are interpolated with
//! the same barycentric weights, so flat shading is just Gouraud shading
//! with three identical colors.
//!
//! Every pixel goes through [`Rasterizer::put_pixel`], which applies the
//! clip rectangle, the mask check, semi-transparency and the forced mask
//! bit in that order.
//!
//! # References
//!
//! - [Triangle Rasterization Tutorial](https://www.sunshine2k.de/coding/java/TriangleRasterization/TriangleRasterization.html)
//! - [Scratchapixel: Rasterization](https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation)

use super::super::primitives::{Color, SemiTransparency, TextureInfo};
use super::super::registers::TextureWindow;
use super::super::GPU;
use super::texture::{modulate, sample_texel};

/// Largest polygon extent the hardware will draw
const MAX_WIDTH: i32 = 1023;
const MAX_HEIGHT: i32 = 511;

/// A vertex after the drawing offset has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadedVertex {
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub u: u8,
    pub v: u8,
}

/// Texture state for a textured primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub info: TextureInfo,
    pub window: TextureWindow,
    /// Raw textures skip color modulation
    pub raw: bool,
}

impl Texture {
    /// Resolve the output color for a texel, or `None` when transparent
    ///
    /// Returns the final color and whether semi-transparency applies to it.
    #[inline(always)]
    fn shade(&self, vram: &[u16], u: u8, v: u8, color: Color) -> Option<u16> {
        let texel = sample_texel(vram, &self.info, &self.window, u, v);
        if texel == 0 {
            return None;
        }
        Some(if self.raw { texel } else { modulate(texel, color) })
    }
}

/// Triangle, line and rectangle rasterizer
///
/// # Examples
///
/// ```
/// use xsp::core::gpu::{Color, Rasterizer, ShadedVertex};
///
/// let mut vram = vec![0u16; 1024 * 512];
/// let rasterizer = Rasterizer::new();
///
/// let red = Color { r: 0xFF, g: 0, b: 0 };
/// let v = |x, y| ShadedVertex { x, y, color: red, ..Default::default() };
/// rasterizer.draw_triangle(&mut vram, [v(100, 100), v(200, 100), v(150, 200)], None, None);
///
/// assert_eq!(vram[150 * 1024 + 150], 0x001F);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rasterizer {
    /// Inclusive clip rectangle (left, top, right, bottom)
    clip_rect: (i32, i32, i32, i32),
    /// Force bit 15 on every written pixel
    set_mask: bool,
    /// Skip pixels whose destination has bit 15 set
    check_mask: bool,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            clip_rect: (0, 0, 1023, 511),
            set_mask: false,
            check_mask: false,
        }
    }

    pub fn set_clip_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.clip_rect = (left, top, right, bottom);
    }

    pub fn clip_rect(&self) -> (i32, i32, i32, i32) {
        self.clip_rect
    }

    /// Mask settings from GP0(E6h)
    pub fn set_mask_settings(&mut self, set_mask: bool, check_mask: bool) {
        self.set_mask = set_mask;
        self.check_mask = check_mask;
    }

    pub fn set_mask(&self) -> bool {
        self.set_mask
    }

    pub fn check_mask(&self) -> bool {
        self.check_mask
    }

    /// Write one pixel through the mask and blending pipeline
    ///
    /// `blend` is applied only when bit 15 of `color` is set for textured
    /// pixels; callers resolve that and pass `None` otherwise.
    #[inline(always)]
    pub fn put_pixel(
        &self,
        vram: &mut [u16],
        x: i32,
        y: i32,
        color: u16,
        blend: Option<SemiTransparency>,
    ) {
        let (left, top, right, bottom) = self.clip_rect;
        if x < left || x > right || y < top || y > bottom {
            return;
        }
        if !(0..GPU::VRAM_WIDTH as i32).contains(&x) || !(0..GPU::VRAM_HEIGHT as i32).contains(&y)
        {
            return;
        }

        let index = y as usize * GPU::VRAM_WIDTH + x as usize;
        let back = vram[index];
        if self.check_mask && back & 0x8000 != 0 {
            return;
        }

        let mut out = match blend {
            Some(mode) => mode.blend(back, color) | (color & 0x8000),
            None => color,
        };
        if self.set_mask {
            out |= 0x8000;
        }
        vram[index] = out;
    }

    /// Rasterize a triangle
    ///
    /// With `texture` set, each pixel samples the texture at the
    /// interpolated UV and modulates it by the interpolated color. Texels
    /// without bit 15 are never blended.
    pub fn draw_triangle(
        &self,
        vram: &mut [u16],
        vertices: [ShadedVertex; 3],
        texture: Option<&Texture>,
        blend: Option<SemiTransparency>,
    ) {
        let [mut v0, mut v1, mut v2] = vertices;
        let mut area = edge(&v0, &v1, v2.x, v2.y);
        if area == 0 {
            return;
        }
        if area < 0 {
            std::mem::swap(&mut v1, &mut v2);
            area = -area;
        }

        let min_x = v0.x.min(v1.x).min(v2.x);
        let max_x = v0.x.max(v1.x).max(v2.x);
        let min_y = v0.y.min(v1.y).min(v2.y);
        let max_y = v0.y.max(v1.y).max(v2.y);
        if max_x - min_x > MAX_WIDTH || max_y - min_y > MAX_HEIGHT {
            log::trace!("Dropping oversized triangle ({}x{})", max_x - min_x, max_y - min_y);
            return;
        }

        let (left, top, right, bottom) = self.clip_rect;
        let x_start = min_x.max(left);
        let x_end = max_x.min(right);
        let y_start = min_y.max(top);
        let y_end = max_y.min(bottom);

        // Pixels exactly on a bottom or right edge belong to the neighbour
        let bias0 = if is_top_left(&v1, &v2) { 0 } else { -1 };
        let bias1 = if is_top_left(&v2, &v0) { 0 } else { -1 };
        let bias2 = if is_top_left(&v0, &v1) { 0 } else { -1 };

        let area = area as i64;
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let w0 = edge(&v1, &v2, x, y);
                let w1 = edge(&v2, &v0, x, y);
                let w2 = edge(&v0, &v1, x, y);
                if w0 + bias0 < 0 || w1 + bias1 < 0 || w2 + bias2 < 0 {
                    continue;
                }

                let (w0, w1, w2) = (w0 as i64, w1 as i64, w2 as i64);
                let lerp = |a: u8, b: u8, c: u8| -> u8 {
                    ((w0 * a as i64 + w1 * b as i64 + w2 * c as i64) / area) as u8
                };
                let color = Color {
                    r: lerp(v0.color.r, v1.color.r, v2.color.r),
                    g: lerp(v0.color.g, v1.color.g, v2.color.g),
                    b: lerp(v0.color.b, v1.color.b, v2.color.b),
                };

                match texture {
                    Some(tex) => {
                        let u = lerp(v0.u, v1.u, v2.u);
                        let v = lerp(v0.v, v1.v, v2.v);
                        if let Some(texel) = tex.shade(vram, u, v, color) {
                            let mode = blend.filter(|_| texel & 0x8000 != 0);
                            self.put_pixel(vram, x, y, texel, mode);
                        }
                    }
                    None => self.put_pixel(vram, x, y, color.to_rgb15(), blend),
                }
            }
        }
    }

    /// Draw an axis-aligned rectangle
    ///
    /// `origin` is the top-left corner after the drawing offset; for
    /// textured rectangles `uv` is the texel at that corner. `flip` mirrors
    /// the texture horizontally and vertically (GP0 E1h bits 12-13).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rectangle(
        &self,
        vram: &mut [u16],
        origin: (i32, i32),
        size: (u16, u16),
        color: Color,
        texture: Option<(&Texture, (u8, u8))>,
        flip: (bool, bool),
        blend: Option<SemiTransparency>,
    ) {
        let (ox, oy) = origin;
        let (width, height) = (size.0 as i32, size.1 as i32);
        let (left, top, right, bottom) = self.clip_rect;

        for dy in 0..height {
            let y = oy + dy;
            if y < top || y > bottom {
                continue;
            }
            for dx in 0..width {
                let x = ox + dx;
                if x < left || x > right {
                    continue;
                }
                match texture {
                    Some((tex, (u0, v0))) => {
                        let u = if flip.0 {
                            u0.wrapping_sub(dx as u8)
                        } else {
                            u0.wrapping_add(dx as u8)
                        };
                        let v = if flip.1 {
                            v0.wrapping_sub(dy as u8)
                        } else {
                            v0.wrapping_add(dy as u8)
                        };
                        if let Some(texel) = tex.shade(vram, u, v, color) {
                            let mode = blend.filter(|_| texel & 0x8000 != 0);
                            self.put_pixel(vram, x, y, texel, mode);
                        }
                    }
                    None => self.put_pixel(vram, x, y, color.to_rgb15(), blend),
                }
            }
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed area of the parallelogram (a→b, a→p)
#[inline(always)]
fn edge(a: &ShadedVertex, b: &ShadedVertex, px: i32, py: i32) -> i32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Top or left edge of a triangle with positive winding
#[inline(always)]
fn is_top_left(a: &ShadedVertex, b: &ShadedVertex) -> bool {
    (a.y == b.y && b.x > a.x) || b.y < a.y
}
