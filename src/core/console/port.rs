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

//! Diagnostic port window (0x1F802000-0x1F802FFF)
//!
//! Expansion region 2 carries the development-board DUART and the POST
//! seven-segment display. Only the pieces the kernel actually pokes are
//! modeled: both transmit holding registers feed the console overlay and the
//! POST register is latched as `seg7`. Everything else reads as zero, except
//! the DUART status register which always reports the transmitter ready.

use super::Console;
use crate::core::error::Result;
use crate::core::memory::IODevice;

/// Expansion region 2 device
#[derive(Debug, Clone, Default)]
pub struct DiagnosticPort {
    console: Console,

    /// POST / seven-segment display value
    seg7: u32,
}

impl DiagnosticPort {
    /// Window start
    pub const BASE: u32 = 0x1F80_2000;

    /// Window end (inclusive)
    pub const END: u32 = 0x1F80_2FFF;

    /// DUART channel A status register
    const DUART_SRA: u32 = 0x21;

    /// DUART channel A transmit holding register
    const DUART_THRA: u32 = 0x23;

    /// POST register
    const POST: u32 = 0x41;

    /// Secondary TX port used by some kernels
    const TX_ALT: u32 = 0x80;

    /// TXRDY | TXEMT
    const TX_READY: u8 = 0x0C;

    pub fn new() -> Self {
        Self::default()
    }

    /// Console overlay fed by this port
    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Last POST value
    pub fn seg7(&self) -> u32 {
        self.seg7
    }

    /// Blank the console and clear the POST latch
    pub fn reset(&mut self) {
        self.console.clear();
        self.seg7 = 0;
    }

    /// Restore overlay words and the POST latch (shared-state import)
    pub(crate) fn restore(&mut self, words: &[u32], seg7: u32) {
        self.console.restore(words);
        self.seg7 = seg7;
    }

    fn read_byte(&self, offset: u32) -> u8 {
        match offset {
            Self::DUART_SRA => Self::TX_READY,
            Self::POST => self.seg7 as u8,
            _ => 0,
        }
    }

    fn write_byte(&mut self, offset: u32, value: u8) {
        match offset {
            Self::DUART_THRA | Self::TX_ALT => self.console.put_char(value),
            Self::POST => {
                self.seg7 = value as u32;
                log::debug!("POST: 0x{:02X}", value);
            }
            _ => log::trace!(
                "Diagnostic port write 0x{:02X} at +0x{:03X} ignored",
                value,
                offset
            ),
        }
    }
}

impl IODevice for DiagnosticPort {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::END)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        let base = offset & !0x3;
        Ok((0..4).fold(0u32, |acc, lane| {
            acc | ((self.read_byte(base + lane) as u32) << (lane * 8))
        }))
    }

    /// Word stores land byte by byte, so a store to 0x1F802080 prints its
    /// low byte and a store to 0x1F802020 prints its high byte.
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let base = offset & !0x3;
        for lane in 0..4 {
            self.write_byte(base + lane, (value >> (lane * 8)) as u8);
        }
        Ok(())
    }

    fn read_register16(&mut self, offset: u32) -> Result<u16> {
        let base = offset & !0x1;
        Ok(self.read_byte(base) as u16 | ((self.read_byte(base + 1) as u16) << 8))
    }

    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let base = offset & !0x1;
        self.write_byte(base, value as u8);
        self.write_byte(base + 1, (value >> 8) as u8);
        Ok(())
    }

    fn read_register8(&mut self, offset: u32) -> Result<u8> {
        Ok(self.read_byte(offset))
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        self.write_byte(offset, value);
        Ok(())
    }

    fn name(&self) -> &str {
        "Diagnostic Port"
    }
}
