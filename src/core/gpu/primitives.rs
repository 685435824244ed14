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

//! GPU primitive type definitions
//!
//! Colors, vertices, texture coordinates and the texture/blending parameters
//! decoded out of GP0 drawing packets.

/// A 24-bit RGB color used in GPU commands
///
/// Drawing packets carry 8 bits per channel; VRAM stores 5 bits per channel.
///
/// # Examples
///
/// ```
/// use xsp::core::gpu::Color;
///
/// let color = Color::from_u32(0x00FF8040);
/// assert_eq!(color.r, 0x40);
/// assert_eq!(color.g, 0x80);
/// assert_eq!(color.b, 0xFF);
///
/// let rgb15 = color.to_rgb15();
/// assert_eq!(rgb15 & 0x1F, 0x08);
/// assert_eq!((rgb15 >> 5) & 0x1F, 0x10);
/// assert_eq!((rgb15 >> 10) & 0x1F, 0x1F);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Color {
    /// Neutral modulation color: texels are drawn unchanged
    pub const NEUTRAL: Color = Color {
        r: 0x80,
        g: 0x80,
        b: 0x80,
    };

    /// Decode a color from bits 0-23 of a command word
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Convert to the 5-5-5 VRAM format (bit 15 clear)
    pub fn to_rgb15(&self) -> u16 {
        let r = ((self.r as u16) >> 3) & 0x1F;
        let g = ((self.g as u16) >> 3) & 0x1F;
        let b = ((self.b as u16) >> 3) & 0x1F;
        (b << 10) | (g << 5) | r
    }
}

/// A 2D vertex position (signed 11-bit coordinates sign-extended to 16 bits)
///
/// # Examples
///
/// ```
/// use xsp::core::gpu::Vertex;
///
/// let vertex = Vertex::from_u32(0x00640032);
/// assert_eq!(vertex.x, 50);
/// assert_eq!(vertex.y, 100);
///
/// // Bit 10 is the sign bit
/// let negative = Vertex::from_u32(0x000007FF);
/// assert_eq!(negative.x, -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vertex {
    /// X coordinate
    pub x: i16,
    /// Y coordinate
    pub y: i16,
}

impl Vertex {
    /// Decode a vertex word: X in bits 0-10, Y in bits 16-26
    pub fn from_u32(value: u32) -> Self {
        Self {
            x: sign_extend_11(value as u16),
            y: sign_extend_11((value >> 16) as u16),
        }
    }

    /// Offset this vertex by the drawing offset
    pub fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

/// Sign-extend the low 11 bits of a coordinate
#[inline(always)]
pub(crate) fn sign_extend_11(value: u16) -> i16 {
    (((value & 0x7FF) << 5) as i16) >> 5
}

/// Texture coordinate within a texture page
///
/// # Examples
///
/// ```
/// use xsp::core::gpu::TexCoord;
///
/// let texcoord = TexCoord::from_u32(0x00804020);
/// assert_eq!(texcoord.u, 0x20);
/// assert_eq!(texcoord.v, 0x40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TexCoord {
    /// Horizontal texel coordinate
    pub u: u8,
    /// Vertical texel coordinate
    pub v: u8,
}

impl TexCoord {
    /// Decode U from bits 0-7 and V from bits 8-15
    pub fn from_u32(value: u32) -> Self {
        Self {
            u: (value & 0xFF) as u8,
            v: ((value >> 8) & 0xFF) as u8,
        }
    }
}

/// Texture color depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureDepth {
    /// 4-bit CLUT indices
    #[default]
    T4Bit,
    /// 8-bit CLUT indices
    T8Bit,
    /// Direct 15-bit texels
    T15Bit,
}

impl From<u8> for TextureDepth {
    fn from(value: u8) -> Self {
        match value & 3 {
            0 => TextureDepth::T4Bit,
            1 => TextureDepth::T8Bit,
            _ => TextureDepth::T15Bit,
        }
    }
}

/// Semi-transparency blending equation (B = background, F = foreground)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemiTransparency {
    /// B/2 + F/2
    #[default]
    Average,
    /// B + F
    Add,
    /// B - F
    Subtract,
    /// B + F/4
    AddQuarter,
}

impl From<u8> for SemiTransparency {
    fn from(value: u8) -> Self {
        match value & 3 {
            0 => SemiTransparency::Average,
            1 => SemiTransparency::Add,
            2 => SemiTransparency::Subtract,
            _ => SemiTransparency::AddQuarter,
        }
    }
}

impl SemiTransparency {
    /// Blend foreground over background, both 5-5-5
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::gpu::SemiTransparency;
    ///
    /// // Additive blending saturates at 31 per channel
    /// assert_eq!(SemiTransparency::Add.blend(0x001F, 0x0001), 0x001F);
    /// // Subtractive blending floors at 0
    /// assert_eq!(SemiTransparency::Subtract.blend(0x0001, 0x001F), 0x0000);
    /// ```
    pub fn blend(self, back: u16, front: u16) -> u16 {
        let channel = |shift: u16| -> u16 {
            let b = ((back >> shift) & 0x1F) as i32;
            let f = ((front >> shift) & 0x1F) as i32;
            let out = match self {
                SemiTransparency::Average => (b + f) >> 1,
                SemiTransparency::Add => b + f,
                SemiTransparency::Subtract => b - f,
                SemiTransparency::AddQuarter => b + (f >> 2),
            };
            (out.clamp(0, 31) as u16) << shift
        };
        channel(0) | channel(5) | channel(10)
    }
}

/// Texture page and CLUT location used by a textured primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureInfo {
    /// Texture page base X in VRAM pixels (multiple of 64)
    pub page_x: u16,
    /// Texture page base Y in VRAM pixels (0 or 256)
    pub page_y: u16,
    /// CLUT X in VRAM pixels (multiple of 16)
    pub clut_x: u16,
    /// CLUT Y in VRAM pixels
    pub clut_y: u16,
    /// Color depth of the texels
    pub depth: TextureDepth,
}

impl TextureInfo {
    /// Build from a CLUT attribute (upper half of the first UV word) and a
    /// texpage attribute (upper half of the second UV word)
    pub fn from_attributes(clut: u16, texpage: u16) -> Self {
        Self {
            page_x: (texpage & 0x0F) * 64,
            page_y: ((texpage >> 4) & 0x01) * 256,
            clut_x: (clut & 0x3F) * 16,
            clut_y: (clut >> 6) & 0x1FF,
            depth: TextureDepth::from(((texpage >> 7) & 0x03) as u8),
        }
    }
}
