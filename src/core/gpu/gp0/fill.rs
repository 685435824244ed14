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

//! GP0 Fill Rectangle and interrupt request
//!
//! GP0(02h) performs fast VRAM fills. It works on raw VRAM coordinates and
//! ignores the drawing area, drawing offset and mask settings.

use super::super::primitives::Color;
use super::super::GPU;

impl GPU {
    /// GP0(02h): Fill Rectangle in VRAM
    ///
    /// # Command Format
    ///
    /// ```text
    /// Word 0: 02BBGGRR   fill color
    /// Word 1: YYYYXXXX   top-left corner
    /// Word 2: HHHHWWWW   size
    /// ```
    ///
    /// X is rounded down and the width rounded up to a multiple of 16
    /// pixels; both coordinates wrap around VRAM.
    pub(in crate::core::gpu) fn gp0_fill_rectangle(&mut self, words: &[u32]) {
        let color = Color::from_u32(words[0]).to_rgb15();
        let x = (words[1] & 0x3F0) as u16;
        let y = ((words[1] >> 16) & 0x1FF) as u16;
        let width = ((((words[2] & 0x3FF) + 0x0F) & !0x0F) & 0x7FF) as u16;
        let height = ((words[2] >> 16) & 0x1FF) as u16;

        log::debug!(
            "GP0 fill ({}, {}) {}×{} color=0x{:04X}",
            x,
            y,
            width,
            height,
            color
        );

        for dy in 0..height {
            for dx in 0..width {
                self.write_vram(x.wrapping_add(dx), y.wrapping_add(dy), color);
            }
        }
    }

    /// GP0(1Fh): Interrupt Request
    ///
    /// Sets GPUSTAT bit 24 until acknowledged with GP1(02h).
    pub(in crate::core::gpu) fn gp0_interrupt_request(&mut self) {
        if !self.interrupt_request {
            self.interrupt_request = true;
            self.irq_pending = true;
            log::debug!("GPU interrupt requested");
        }
    }
}
