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

//! Texture sampling
//!
//! Texels are fetched from VRAM inside the active texture page. 4-bit and
//! 8-bit textures store CLUT indices packed into 16-bit VRAM words; 15-bit
//! textures store colors directly. A texel value of 0x0000 is transparent.

use super::super::primitives::{Color, TextureDepth, TextureInfo};
use super::super::registers::TextureWindow;
use super::super::GPU;

#[inline(always)]
fn vram_at(vram: &[u16], x: u16, y: u16) -> u16 {
    let index = ((y & 0x1FF) as usize) * GPU::VRAM_WIDTH + (x & 0x3FF) as usize;
    vram[index]
}

/// Fetch the texel at (u, v) after applying the texture window
///
/// # Examples
///
/// ```
/// use xsp::core::gpu::{sample_texel, TextureDepth, TextureInfo, TextureWindow};
///
/// let mut vram = vec![0u16; 1024 * 512];
/// // 15-bit texture page at (64, 0) with a single red texel at (2, 1)
/// vram[1 * 1024 + 64 + 2] = 0x001F;
///
/// let info = TextureInfo { page_x: 64, depth: TextureDepth::T15Bit, ..Default::default() };
/// let texel = sample_texel(&vram, &info, &TextureWindow::default(), 2, 1);
/// assert_eq!(texel, 0x001F);
/// ```
pub fn sample_texel(vram: &[u16], info: &TextureInfo, window: &TextureWindow, u: u8, v: u8) -> u16 {
    let (u, v) = window.apply(u, v);
    let u = u as u16;
    let y = info.page_y + v as u16;

    match info.depth {
        TextureDepth::T4Bit => {
            let word = vram_at(vram, info.page_x + u / 4, y);
            let index = (word >> ((u % 4) * 4)) & 0x0F;
            vram_at(vram, info.clut_x + index, info.clut_y)
        }
        TextureDepth::T8Bit => {
            let word = vram_at(vram, info.page_x + u / 2, y);
            let index = (word >> ((u % 2) * 8)) & 0xFF;
            vram_at(vram, info.clut_x + index, info.clut_y)
        }
        TextureDepth::T15Bit => vram_at(vram, info.page_x + u, y),
    }
}

/// Modulate a texel by a vertex color (0x80 = unchanged), preserving bit 15
pub fn modulate(texel: u16, color: Color) -> u16 {
    let channel = |shift: u16, factor: u8| -> u16 {
        let value = ((texel >> shift) & 0x1F) as u32 * factor as u32 / 0x80;
        (value.min(0x1F) as u16) << shift
    };
    (texel & 0x8000) | channel(0, color.r) | channel(5, color.g) | channel(10, color.b)
}
