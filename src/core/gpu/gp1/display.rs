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

//! GP1 display configuration commands
//!
//! Display enable, display start, display ranges and video mode.

use super::super::registers::{DisplayMode, VerticalRes};
use super::super::GPU;

impl GPU {
    /// GP1(03h): Display Enable (bit 0: 0 = on, 1 = off)
    pub(in crate::core::gpu) fn gp1_display_enable(&mut self, value: u32) {
        self.display_disabled = value & 1 != 0;
        log::debug!(
            "Display {}",
            if self.display_disabled {
                "disabled"
            } else {
                "enabled"
            }
        );
    }

    /// GP1(05h): Start of Display Area (X bits 0-9, Y bits 10-18)
    pub(in crate::core::gpu) fn gp1_display_area_start(&mut self, value: u32) {
        self.display_area.x = (value & 0x3FF) as u16;
        self.display_area.y = ((value >> 10) & 0x1FF) as u16;
        log::debug!(
            "Display area start: ({}, {})",
            self.display_area.x,
            self.display_area.y
        );
    }

    /// GP1(06h): Horizontal Display Range (X1 bits 0-11, X2 bits 12-23)
    pub(in crate::core::gpu) fn gp1_horizontal_display_range(&mut self, value: u32) {
        self.display_range.x1 = (value & 0xFFF) as u16;
        self.display_range.x2 = ((value >> 12) & 0xFFF) as u16;
        log::debug!(
            "Horizontal display range: {} to {}",
            self.display_range.x1,
            self.display_range.x2
        );
    }

    /// GP1(07h): Vertical Display Range (Y1 bits 0-9, Y2 bits 10-19)
    pub(in crate::core::gpu) fn gp1_vertical_display_range(&mut self, value: u32) {
        self.display_range.y1 = (value & 0x3FF) as u16;
        self.display_range.y2 = ((value >> 10) & 0x3FF) as u16;
        log::debug!(
            "Vertical display range: {} to {}",
            self.display_range.y1,
            self.display_range.y2
        );
    }

    /// GP1(08h): Display Mode
    ///
    /// ```text
    /// Bits 0-1: Horizontal resolution 1 (256/320/512/640)
    /// Bit  2:   Vertical resolution (240/480, 480 needs interlace)
    /// Bit  3:   Video mode (NTSC/PAL)
    /// Bit  4:   Display color depth (15/24 bit)
    /// Bit  5:   Vertical interlace
    /// Bit  6:   Horizontal resolution 2 (368, overrides bits 0-1)
    /// Bit  7:   Reverse flag
    /// ```
    pub(in crate::core::gpu) fn gp1_display_mode(&mut self, value: u32) {
        self.display_mode = DisplayMode::from_bits(value);
        self.display_area.width = self.display_mode.horizontal_res().width();
        self.display_area.height = match self.display_mode.vertical_res() {
            VerticalRes::R240 => 240,
            VerticalRes::R480 => 480,
        };
        log::debug!(
            "Display mode: {}×{} {:?} {:?} interlaced={}",
            self.display_area.width,
            self.display_area.height,
            self.display_mode.video_mode(),
            self.display_mode.color_depth(),
            self.display_mode.interlaced()
        );
    }
}
