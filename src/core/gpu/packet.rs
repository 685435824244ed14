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

//! GP0 packet decoding
//!
//! The top byte of the first word of a packet selects the command. Drawing
//! commands encode their shape in the opcode bits, so the packet length is
//! derived from those bits rather than looked up per opcode:
//!
//! ```text
//! Polygon  001G QTSR   G=gouraud Q=quad T=textured S=semi-transparent R=raw texture
//! Line     010G P0S0   P=polyline
//! Rect     011Z ZTSR   ZZ=size (variable, 1x1, 8x8, 16x16)
//! ```

use crate::core::error::GpuError;

/// Shape flags of a polygon command (0x20-0x3F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonFlags {
    pub shaded: bool,
    pub quad: bool,
    pub textured: bool,
    pub semi_transparent: bool,
    pub raw_texture: bool,
}

impl PolygonFlags {
    pub fn vertex_count(&self) -> usize {
        if self.quad {
            4
        } else {
            3
        }
    }

    /// Total packet length in words
    ///
    /// Every vertex carries a position word and, when textured, a UV word.
    /// Shaded polygons carry a color per vertex; the first color shares the
    /// command word.
    pub fn word_count(&self) -> usize {
        let n = self.vertex_count();
        let colors = if self.shaded { n } else { 1 };
        n * (1 + self.textured as usize) + colors
    }
}

/// Shape flags of a line command (0x40-0x5F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFlags {
    pub shaded: bool,
    pub polyline: bool,
    pub semi_transparent: bool,
}

impl LineFlags {
    /// Words needed to draw the first segment
    pub fn word_count(&self) -> usize {
        if self.shaded {
            4
        } else {
            3
        }
    }
}

/// Rectangle size selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectSize {
    Variable,
    Pixel,
    Sprite8,
    Sprite16,
}

impl RectSize {
    /// Fixed dimensions, or `None` when the packet carries a size word
    pub fn fixed(&self) -> Option<(u16, u16)> {
        match self {
            RectSize::Variable => None,
            RectSize::Pixel => Some((1, 1)),
            RectSize::Sprite8 => Some((8, 8)),
            RectSize::Sprite16 => Some((16, 16)),
        }
    }
}

/// Shape flags of a rectangle command (0x60-0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectFlags {
    pub size: RectSize,
    pub textured: bool,
    pub semi_transparent: bool,
    pub raw_texture: bool,
}

impl RectFlags {
    pub fn word_count(&self) -> usize {
        2 + self.textured as usize + (self.size == RectSize::Variable) as usize
    }
}

/// A decoded GP0 command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Nop,
    ClearCache,
    FillRectangle,
    IrqRequest,
    Polygon(PolygonFlags),
    Line(LineFlags),
    Rectangle(RectFlags),
    VramToVram,
    CpuToVram,
    VramToCpu,
    DrawMode,
    TextureWindow,
    DrawAreaTopLeft,
    DrawAreaBottomRight,
    DrawOffset,
    MaskSettings,
}

impl Packet {
    /// Decode the command selected by the first word of a packet
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::InvalidGp0Command`] for opcodes with no meaning;
    /// the caller drops that single word and resynchronizes.
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::gpu::Packet;
    ///
    /// assert_eq!(Packet::decode(0x0200_0000).unwrap().word_count(), 3);
    /// // Shaded textured quad is the longest packet
    /// assert_eq!(Packet::decode(0x3C00_0000).unwrap().word_count(), 12);
    /// assert!(Packet::decode(0xFF00_0000).is_err());
    /// ```
    pub fn decode(word: u32) -> Result<Self, GpuError> {
        let opcode = (word >> 24) as u8;
        let packet = match opcode {
            0x00 | 0x03..=0x1E => Packet::Nop,
            0x01 => Packet::ClearCache,
            0x02 => Packet::FillRectangle,
            0x1F => Packet::IrqRequest,
            0x20..=0x3F => Packet::Polygon(PolygonFlags {
                shaded: opcode & 0x10 != 0,
                quad: opcode & 0x08 != 0,
                textured: opcode & 0x04 != 0,
                semi_transparent: opcode & 0x02 != 0,
                raw_texture: opcode & 0x01 != 0,
            }),
            0x40..=0x5F => Packet::Line(LineFlags {
                shaded: opcode & 0x10 != 0,
                polyline: opcode & 0x08 != 0,
                semi_transparent: opcode & 0x02 != 0,
            }),
            0x60..=0x7F => Packet::Rectangle(RectFlags {
                size: match (opcode >> 3) & 3 {
                    0 => RectSize::Variable,
                    1 => RectSize::Pixel,
                    2 => RectSize::Sprite8,
                    _ => RectSize::Sprite16,
                },
                textured: opcode & 0x04 != 0,
                semi_transparent: opcode & 0x02 != 0,
                raw_texture: opcode & 0x01 != 0,
            }),
            0x80..=0x9F => Packet::VramToVram,
            0xA0..=0xBF => Packet::CpuToVram,
            0xC0..=0xDF => Packet::VramToCpu,
            0xE1 => Packet::DrawMode,
            0xE2 => Packet::TextureWindow,
            0xE3 => Packet::DrawAreaTopLeft,
            0xE4 => Packet::DrawAreaBottomRight,
            0xE5 => Packet::DrawOffset,
            0xE6 => Packet::MaskSettings,
            _ => return Err(GpuError::InvalidGp0Command { command: word }),
        };
        Ok(packet)
    }

    /// Number of words the packet occupies in the FIFO
    ///
    /// For polylines this covers the first segment only; further vertices
    /// are streamed until the terminator word.
    pub fn word_count(&self) -> usize {
        match self {
            Packet::FillRectangle | Packet::CpuToVram | Packet::VramToCpu => 3,
            Packet::VramToVram => 4,
            Packet::Polygon(flags) => flags.word_count(),
            Packet::Line(flags) => flags.word_count(),
            Packet::Rectangle(flags) => flags.word_count(),
            _ => 1,
        }
    }
}
