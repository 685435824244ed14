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

//! Presentation boundary
//!
//! The engine never presents anything itself. This module turns what it
//! leaves behind at the end of a tick (VRAM, the display registers and the
//! console overlay grid) into one RGBA8 image that any host can blit:
//!
//! - [`GlyphAtlas`]: the 16×16 grid of 8×8 glyphs the overlay is drawn with
//! - [`Framebuffer`]: the composed 800×600 output image

mod framebuffer;
mod glyph;

#[cfg(test)]
mod tests;

pub use framebuffer::Framebuffer;
pub use glyph::GlyphAtlas;

/// Expand an RGB555 color to RGBA8 (opaque)
#[inline(always)]
pub fn rgb555_to_rgba(color: u16) -> [u8; 4] {
    let r = ((color & 0x1F) << 3) as u8;
    let g = (((color >> 5) & 0x1F) << 3) as u8;
    let b = (((color >> 10) & 0x1F) << 3) as u8;
    [r, g, b, 0xFF]
}
