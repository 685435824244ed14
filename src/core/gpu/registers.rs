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

//! GPU register type definitions
//!
//! Drawing state set by GP0(E1h-E6h), display state set by GP1 and the
//! in-flight VRAM transfer descriptor.

use super::primitives::{SemiTransparency, TextureDepth};

/// Drawing mode (GP0 E1h, mirrored into GPUSTAT bits 0-10 and 15)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawMode {
    /// Texture page X base in 64-pixel units (0-15)
    pub texture_page_x_base: u8,
    /// Texture page Y base in 256-line units (0-1)
    pub texture_page_y_base: u8,
    /// Semi-transparency mode (0-3)
    pub semi_transparency: u8,
    /// Texture depth (0=4bit, 1=8bit, 2=15bit)
    pub texture_depth: u8,
    /// Dithering enable (stored, not applied)
    pub dithering: bool,
    /// Drawing to the displayed area allowed
    pub draw_to_display: bool,
    /// Texture disable
    pub texture_disable: bool,
    /// Textured rectangle X flip
    pub texture_x_flip: bool,
    /// Textured rectangle Y flip
    pub texture_y_flip: bool,
}

impl DrawMode {
    /// Decode from a GP0(E1h) parameter
    pub fn from_bits(value: u32) -> Self {
        Self {
            texture_page_x_base: (value & 0x0F) as u8,
            texture_page_y_base: ((value >> 4) & 0x01) as u8,
            semi_transparency: ((value >> 5) & 0x03) as u8,
            texture_depth: ((value >> 7) & 0x03) as u8,
            dithering: (value >> 9) & 1 != 0,
            draw_to_display: (value >> 10) & 1 != 0,
            texture_disable: (value >> 11) & 1 != 0,
            texture_x_flip: (value >> 12) & 1 != 0,
            texture_y_flip: (value >> 13) & 1 != 0,
        }
    }

    /// Apply the texpage attribute carried by textured polygons
    ///
    /// Only the page base, blending mode and depth are updated; the
    /// remaining fields keep their E1h values.
    pub fn apply_texpage(&mut self, texpage: u16) {
        self.texture_page_x_base = (texpage & 0x0F) as u8;
        self.texture_page_y_base = ((texpage >> 4) & 0x01) as u8;
        self.semi_transparency = ((texpage >> 5) & 0x03) as u8;
        self.texture_depth = ((texpage >> 7) & 0x03) as u8;
        self.texture_disable = (texpage >> 11) & 1 != 0;
    }

    /// GPUSTAT bits 0-10 and 15
    pub fn status_bits(&self) -> u32 {
        (self.texture_page_x_base as u32 & 0x0F)
            | ((self.texture_page_y_base as u32 & 0x01) << 4)
            | ((self.semi_transparency as u32 & 0x03) << 5)
            | ((self.texture_depth as u32 & 0x03) << 7)
            | ((self.dithering as u32) << 9)
            | ((self.draw_to_display as u32) << 10)
            | ((self.texture_disable as u32) << 15)
    }

    /// Blending equation selected by this mode
    pub fn blending(&self) -> SemiTransparency {
        SemiTransparency::from(self.semi_transparency)
    }

    /// Texture depth selected by this mode
    pub fn depth(&self) -> TextureDepth {
        TextureDepth::from(self.texture_depth)
    }
}

/// Drawing area (clip rectangle, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingArea {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Default for DrawingArea {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 1023,
            bottom: 511,
        }
    }
}

/// Texture window (GP0 E2h), all fields in 8-pixel steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureWindow {
    pub mask_x: u8,
    pub mask_y: u8,
    pub offset_x: u8,
    pub offset_y: u8,
}

impl TextureWindow {
    /// Decode from a GP0(E2h) parameter
    pub fn from_bits(value: u32) -> Self {
        Self {
            mask_x: (value & 0x1F) as u8,
            mask_y: ((value >> 5) & 0x1F) as u8,
            offset_x: ((value >> 10) & 0x1F) as u8,
            offset_y: ((value >> 15) & 0x1F) as u8,
        }
    }

    /// Re-encode for GPU info queries
    pub fn bits(&self) -> u32 {
        (self.mask_x as u32)
            | ((self.mask_y as u32) << 5)
            | ((self.offset_x as u32) << 10)
            | ((self.offset_y as u32) << 15)
    }

    /// Apply the window to a texture coordinate pair
    #[inline(always)]
    pub fn apply(&self, u: u8, v: u8) -> (u8, u8) {
        let u = (u & !(self.mask_x << 3)) | ((self.offset_x & self.mask_x) << 3);
        let v = (v & !(self.mask_y << 3)) | ((self.offset_y & self.mask_y) << 3);
        (u, v)
    }
}

/// Area of VRAM shown on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayArea {
    /// Display start X in VRAM (GP1 05h)
    pub x: u16,
    /// Display start Y in VRAM (GP1 05h)
    pub y: u16,
    /// Visible width derived from the display mode
    pub width: u16,
    /// Visible height derived from the display mode
    pub height: u16,
}

impl Default for DisplayArea {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 256,
            height: 240,
        }
    }
}

/// Horizontal and vertical display ranges (GP1 06h/07h)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    pub x1: u16,
    pub x2: u16,
    pub y1: u16,
    pub y2: u16,
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            x1: 0x200,
            x2: 0x200 + 256 * 10,
            y1: 0x010,
            y2: 0x010 + 240,
        }
    }
}

/// Horizontal resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalRes {
    R256,
    R320,
    R368,
    R512,
    R640,
}

impl HorizontalRes {
    /// Width in pixels
    pub fn width(self) -> u16 {
        match self {
            HorizontalRes::R256 => 256,
            HorizontalRes::R320 => 320,
            HorizontalRes::R368 => 368,
            HorizontalRes::R512 => 512,
            HorizontalRes::R640 => 640,
        }
    }
}

/// Vertical resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRes {
    R240,
    R480,
}

/// Video standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    NTSC,
    PAL,
}

/// Display color depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    C15Bit,
    C24Bit,
}

/// Display mode (GP1 08h), kept in raw form so GPUSTAT can mirror it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayMode {
    bits: u8,
}

impl DisplayMode {
    /// Decode the low 8 bits of a GP1(08h) parameter
    pub fn from_bits(value: u32) -> Self {
        Self {
            bits: (value & 0xFF) as u8,
        }
    }

    /// Reconstruct from GPUSTAT bits 14 and 16-22
    pub fn from_status(status: u32) -> Self {
        let hres2 = (status >> 16) & 1;
        let hres1 = (status >> 17) & 3;
        let rest = (status >> 19) & 0x0F;
        let reverse = (status >> 14) & 1;
        Self::from_bits(hres1 | (rest << 2) | (hres2 << 6) | (reverse << 7))
    }

    pub fn horizontal_res(&self) -> HorizontalRes {
        if self.bits & 0x40 != 0 {
            return HorizontalRes::R368;
        }
        match self.bits & 3 {
            0 => HorizontalRes::R256,
            1 => HorizontalRes::R320,
            2 => HorizontalRes::R512,
            _ => HorizontalRes::R640,
        }
    }

    pub fn vertical_res(&self) -> VerticalRes {
        if self.bits & 0x04 != 0 && self.interlaced() {
            VerticalRes::R480
        } else {
            VerticalRes::R240
        }
    }

    pub fn video_mode(&self) -> VideoMode {
        if self.bits & 0x08 != 0 {
            VideoMode::PAL
        } else {
            VideoMode::NTSC
        }
    }

    pub fn color_depth(&self) -> ColorDepth {
        if self.bits & 0x10 != 0 {
            ColorDepth::C24Bit
        } else {
            ColorDepth::C15Bit
        }
    }

    pub fn interlaced(&self) -> bool {
        self.bits & 0x20 != 0
    }

    /// GPUSTAT bits 14 and 16-22
    pub fn status_bits(&self) -> u32 {
        let b = self.bits as u32;
        let hres1 = b & 3;
        let vres = (b >> 2) & 1;
        let video = (b >> 3) & 1;
        let depth = (b >> 4) & 1;
        let interlace = (b >> 5) & 1;
        let hres2 = (b >> 6) & 1;
        let reverse = (b >> 7) & 1;
        (reverse << 14)
            | (hres2 << 16)
            | (hres1 << 17)
            | (vres << 19)
            | (video << 20)
            | (depth << 21)
            | (interlace << 22)
    }
}

/// GP1(04h) DMA direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmaDirection {
    #[default]
    Off,
    Fifo,
    CpuToGp0,
    GpuReadToCpu,
}

impl From<u32> for DmaDirection {
    fn from(value: u32) -> Self {
        match value & 3 {
            0 => DmaDirection::Off,
            1 => DmaDirection::Fifo,
            2 => DmaDirection::CpuToGp0,
            _ => DmaDirection::GpuReadToCpu,
        }
    }
}

/// Direction of an in-flight VRAM transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VRAMTransferDirection {
    CpuToVram,
    VramToCpu,
}

/// Rectangle being streamed through GP0 or GPUREAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VRAMTransfer {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub current_x: u16,
    pub current_y: u16,
    pub direction: VRAMTransferDirection,
}

impl VRAMTransfer {
    /// Decode position and size words, applying the hardware wrap rules
    pub fn new(position: u32, size: u32, direction: VRAMTransferDirection) -> Self {
        let width = ((size & 0xFFFF) as u16).wrapping_sub(1) & 0x3FF;
        let height = (((size >> 16) & 0xFFFF) as u16).wrapping_sub(1) & 0x1FF;
        Self {
            x: (position & 0x3FF) as u16,
            y: ((position >> 16) & 0x1FF) as u16,
            width: width + 1,
            height: height + 1,
            current_x: 0,
            current_y: 0,
            direction,
        }
    }

    /// VRAM coordinates of the next pixel, then advance
    ///
    /// Returns `None` once the rectangle has been exhausted.
    pub fn next_pixel(&mut self) -> Option<(u16, u16)> {
        if self.is_done() {
            return None;
        }
        let x = (self.x + self.current_x) & 0x3FF;
        let y = (self.y + self.current_y) & 0x1FF;
        self.current_x += 1;
        if self.current_x >= self.width {
            self.current_x = 0;
            self.current_y += 1;
        }
        Some((x, y))
    }

    pub fn is_done(&self) -> bool {
        self.current_y >= self.height
    }

    /// Words still expected (two pixels per word)
    pub fn remaining_words(&self) -> u32 {
        let total = self.width as u32 * self.height as u32;
        let done = self.current_y as u32 * self.width as u32 + self.current_x as u32;
        (total - done).div_ceil(2)
    }
}
