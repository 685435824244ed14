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

//! GP1 control commands
//!
//! Reset, interrupt acknowledge, DMA direction and GPU info queries.

use super::super::registers::DmaDirection;
use super::super::GPU;

impl GPU {
    /// GP1(00h): Reset GPU
    ///
    /// Resets all registers and queues but leaves VRAM untouched.
    pub(in crate::core::gpu) fn gp1_reset_gpu(&mut self) {
        self.reset_state_preserving_vram();
        log::debug!("GPU reset");
    }

    /// GP1(01h): Reset Command Buffer
    ///
    /// Clears the FIFO and cancels any transfer or polyline in progress.
    pub(in crate::core::gpu) fn gp1_reset_command_buffer(&mut self) {
        self.fifo.clear();
        self.vram_transfer = None;
        self.polyline = None;
        self.gpuread_latched = false;
        log::debug!("Command buffer reset");
    }

    /// GP1(02h): Acknowledge GPU Interrupt
    pub(in crate::core::gpu) fn gp1_acknowledge_interrupt(&mut self) {
        self.interrupt_request = false;
        self.irq_pending = false;
        log::debug!("GPU interrupt acknowledged");
    }

    /// GP1(04h): DMA Direction
    pub(in crate::core::gpu) fn gp1_dma_direction(&mut self, value: u32) {
        self.dma_direction = DmaDirection::from(value);
        log::debug!("GPU DMA direction: {:?}", self.dma_direction);
    }

    /// GP1(10h-1Fh): Get GPU Info
    ///
    /// The response is latched into GPUREAD:
    ///
    /// - 02h: texture window
    /// - 03h: drawing area top-left
    /// - 04h: drawing area bottom-right
    /// - 05h: drawing offset
    /// - 07h: GPU version
    ///
    /// Other sub-commands leave GPUREAD unchanged.
    pub(in crate::core::gpu) fn gp1_get_gpu_info(&mut self, value: u32) {
        let info_type = value & 0x0F;
        let response = match info_type {
            0x02 => Some(self.texture_window.bits()),
            0x03 => Some(self.draw_area.left as u32 | ((self.draw_area.top as u32) << 10)),
            0x04 => Some(self.draw_area.right as u32 | ((self.draw_area.bottom as u32) << 10)),
            0x05 => {
                let x = self.draw_offset.0 as u32 & 0x7FF;
                let y = self.draw_offset.1 as u32 & 0x7FF;
                Some(x | (y << 11))
            }
            0x07 => Some(Self::GPU_VERSION),
            _ => None,
        };

        log::debug!("GPU info request: type {} -> {:?}", info_type, response);
        if let Some(response) = response {
            self.gpuread = response;
            self.gpuread_latched = true;
        }
    }
}
