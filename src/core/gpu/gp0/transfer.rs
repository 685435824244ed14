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

//! GP0 VRAM transfer commands
//!
//! Implements CPU→VRAM, VRAM→CPU and VRAM→VRAM transfers. Transfers into
//! VRAM honor the mask settings from GP0(E6h).

use super::super::registers::{VRAMTransfer, VRAMTransferDirection};
use super::super::GPU;

impl GPU {
    /// GP0(A0h): CPU→VRAM Transfer
    ///
    /// - Word 0: Command
    /// - Word 1: Destination (X in bits 0-15, Y in bits 16-31)
    /// - Word 2: Size (Width in bits 0-15, Height in bits 16-31)
    ///
    /// After this command, subsequent GP0 writes are treated as pixel data
    /// until the rectangle is filled.
    pub(in crate::core::gpu) fn gp0_cpu_to_vram_transfer(&mut self, words: &[u32]) {
        let transfer = VRAMTransfer::new(words[1], words[2], VRAMTransferDirection::CpuToVram);
        log::debug!(
            "CPU→VRAM transfer: ({}, {}) size {}×{}",
            transfer.x,
            transfer.y,
            transfer.width,
            transfer.height
        );
        self.vram_transfer = Some(transfer);
    }

    /// GP0(C0h): VRAM→CPU Transfer
    ///
    /// Same parameters as GP0(A0h). Pixels are then read through GPUREAD.
    pub(in crate::core::gpu) fn gp0_vram_to_cpu_transfer(&mut self, words: &[u32]) {
        let transfer = VRAMTransfer::new(words[1], words[2], VRAMTransferDirection::VramToCpu);
        log::debug!(
            "VRAM→CPU transfer: ({}, {}) size {}×{}",
            transfer.x,
            transfer.y,
            transfer.width,
            transfer.height
        );
        self.vram_transfer = Some(transfer);
    }

    /// GP0(80h): VRAM→VRAM Copy
    ///
    /// - Word 1: Source (X, Y)
    /// - Word 2: Destination (X, Y)
    /// - Word 3: Size (Width, Height)
    pub(in crate::core::gpu) fn gp0_vram_to_vram_transfer(&mut self, words: &[u32]) {
        let mut src = VRAMTransfer::new(words[1], words[3], VRAMTransferDirection::VramToCpu);
        let mut dst = VRAMTransfer::new(words[2], words[3], VRAMTransferDirection::CpuToVram);
        log::debug!(
            "VRAM→VRAM copy: ({}, {}) -> ({}, {}) size {}×{}",
            src.x,
            src.y,
            dst.x,
            dst.y,
            src.width,
            src.height
        );

        while let (Some((sx, sy)), Some((dx, dy))) = (src.next_pixel(), dst.next_pixel()) {
            let pixel = self.read_vram(sx, sy);
            self.write_vram_masked(dx, dy, pixel);
        }
    }

    /// Process one data word of a CPU→VRAM transfer (two pixels)
    pub(in crate::core::gpu) fn process_vram_write(&mut self, value: u32) {
        let Some(mut transfer) = self.vram_transfer.take() else {
            return;
        };

        for pixel in [value as u16, (value >> 16) as u16] {
            if let Some((x, y)) = transfer.next_pixel() {
                self.write_vram_masked(x, y, pixel);
            }
        }

        if transfer.is_done() {
            log::debug!("CPU→VRAM transfer complete");
        } else {
            self.vram_transfer = Some(transfer);
        }
    }

    /// Store a transferred pixel honoring the mask settings
    fn write_vram_masked(&mut self, x: u16, y: u16, pixel: u16) {
        if self.rasterizer.check_mask() && self.read_vram(x, y) & 0x8000 != 0 {
            return;
        }
        let forced = if self.rasterizer.set_mask() { 0x8000 } else { 0 };
        self.write_vram(x, y, pixel | forced);
    }
}
