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

//! SPU register latch (0x1F801C00-0x1F801FFF)
//!
//! Audio is not synthesized. The SPU window still has to answer the kernel's
//! initialization handshake: it writes SPUCNT and polls SPUSTAT until the
//! low mode bits match, then streams sample data through the transfer FIFO.
//! Registers are stored as plain 16-bit values, SPUSTAT mirrors SPUCNT and
//! the transfer write pointer advances with every FIFO write.

use super::IODevice;
use crate::core::error::Result;

/// SPU register window
#[derive(Debug, Clone)]
pub struct SpuPort {
    regs: Vec<u16>,

    /// Transfer write pointer into SPU RAM (byte address)
    write_ptr: u32,
}

impl SpuPort {
    /// Window start
    pub const BASE: u32 = 0x1F80_1C00;

    /// Window end (inclusive)
    pub const END: u32 = 0x1F80_1FFF;

    /// SPU RAM size in bytes
    pub const RAM_SIZE: u32 = 512 * 1024;

    /// Sound RAM data transfer address (in 8-byte units)
    const TRANSFER_ADDR: u32 = 0x1A6;

    /// Sound RAM data transfer FIFO
    const TRANSFER_FIFO: u32 = 0x1A8;

    /// SPU control register (SPUCNT)
    const SPUCNT: u32 = 0x1AA;

    /// SPU status register (SPUSTAT)
    const SPUSTAT: u32 = 0x1AE;

    pub fn new() -> Self {
        Self {
            regs: vec![0; 0x200],
            write_ptr: 0,
        }
    }

    pub fn reset(&mut self) {
        self.regs.fill(0);
        self.write_ptr = 0;
    }

    /// Transfer write pointer (byte address into SPU RAM)
    pub fn write_ptr(&self) -> u32 {
        self.write_ptr
    }

    /// Restore the write pointer (shared-state import)
    pub(crate) fn restore(&mut self, write_ptr: u32) {
        self.write_ptr = write_ptr % Self::RAM_SIZE;
    }

    /// SPUSTAT: mode bits 0-5 follow SPUCNT, transfer always idle
    fn status(&self) -> u16 {
        self.reg(Self::SPUCNT) & 0x3F
    }

    #[inline(always)]
    fn reg(&self, offset: u32) -> u16 {
        self.regs
            .get((offset / 2) as usize)
            .copied()
            .unwrap_or(0)
    }

    fn read_half(&self, offset: u32) -> u16 {
        match offset {
            Self::SPUSTAT => self.status(),
            Self::TRANSFER_FIFO => 0,
            _ => self.reg(offset),
        }
    }

    fn write_half(&mut self, offset: u32, value: u16) {
        match offset {
            Self::TRANSFER_ADDR => {
                self.write_ptr = (value as u32 * 8) % Self::RAM_SIZE;
                log::trace!("SPU transfer address = 0x{:05X}", self.write_ptr);
            }
            Self::TRANSFER_FIFO => {
                self.write_ptr = (self.write_ptr + 2) % Self::RAM_SIZE;
                return;
            }
            Self::SPUSTAT => return,
            _ => {}
        }

        if let Some(reg) = self.regs.get_mut((offset / 2) as usize) {
            *reg = value;
        }
    }
}

impl Default for SpuPort {
    fn default() -> Self {
        Self::new()
    }
}

impl IODevice for SpuPort {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::END)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        let base = offset & !0x3;
        Ok(self.read_half(base) as u32 | ((self.read_half(base + 2) as u32) << 16))
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let base = offset & !0x3;
        self.write_half(base, value as u16);
        self.write_half(base + 2, (value >> 16) as u16);
        Ok(())
    }

    fn read_register16(&mut self, offset: u32) -> Result<u16> {
        Ok(self.read_half(offset & !0x1))
    }

    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        self.write_half(offset & !0x1, value);
        Ok(())
    }

    fn read_register8(&mut self, offset: u32) -> Result<u8> {
        let half = self.read_half(offset & !0x1);
        Ok((half >> ((offset & 0x1) * 8)) as u8)
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let base = offset & !0x1;
        let shift = (offset & 0x1) * 8;
        let current = self.reg(base);
        let merged = (current & !(0xFF << shift)) | ((value as u16) << shift);
        self.write_half(base, merged);
        Ok(())
    }

    fn name(&self) -> &str {
        "SPU"
    }
}
