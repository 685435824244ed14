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

//! Overlay glyph atlas
//!
//! A 128×128 8-bit image holding 256 glyphs of 8×8 pixels in a 16×16 grid.
//! Glyph `n` lives at column `n % 16`, row `n / 16`. Any non-zero pixel is
//! foreground.

use std::fs;
use std::path::Path;

use crate::core::error::{EmulatorError, Result};

/// 8-bit glyph atlas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAtlas {
    pixels: Vec<u8>,
}

impl GlyphAtlas {
    /// Atlas edge length in pixels
    pub const SIZE: usize = 128;

    /// Glyph edge length in pixels
    pub const GLYPH_SIZE: usize = 8;

    /// Length of the TGA header that precedes the pixel data
    pub const TGA_HEADER: usize = 18;

    /// Atlas with every pixel clear
    ///
    /// Used when no font is configured; overlay cells then only show their
    /// background color.
    pub fn builtin() -> Self {
        Self {
            pixels: vec![0; Self::SIZE * Self::SIZE],
        }
    }

    /// Build from raw atlas pixels (row-major, top row first)
    pub fn from_pixels(pixels: &[u8]) -> Result<Self> {
        let expected = Self::SIZE * Self::SIZE;
        if pixels.len() < expected {
            return Err(EmulatorError::GlyphAtlas(format!(
                "need {} pixels, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels: pixels[..expected].to_vec(),
        })
    }

    /// Load an uncompressed 8-bit TGA
    ///
    /// The header is skipped; the next 256·8·8 bytes are taken as the atlas.
    ///
    /// # Errors
    ///
    /// - `EmulatorError::Io` if the file cannot be read
    /// - `EmulatorError::GlyphAtlas` if it is too short
    pub fn load_tga<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        let body = data.get(Self::TGA_HEADER..).ok_or_else(|| {
            EmulatorError::GlyphAtlas(format!(
                "{}: shorter than a TGA header",
                path.as_ref().display()
            ))
        })?;
        let atlas = Self::from_pixels(body)?;
        log::info!("Glyph atlas loaded from {}", path.as_ref().display());
        Ok(atlas)
    }

    /// Whether pixel (`x`, `y`) of glyph `glyph` is set
    #[inline(always)]
    pub fn is_set(&self, glyph: u8, x: usize, y: usize) -> bool {
        let gx = (glyph as usize % 16) * Self::GLYPH_SIZE + (x & 7);
        let gy = (glyph as usize / 16) * Self::GLYPH_SIZE + (y & 7);
        self.pixels[gy * Self::SIZE + gx] != 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self::builtin()
    }
}
