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

use log::trace;

use super::super::decode::Instruction;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === Store Instructions ===
    //
    // While SR.IsC isolates the cache every store is dropped; the BIOS
    // relies on this when it flushes the instruction cache.

    /// True when the store must be discarded
    fn store_suppressed(&self, addr: u32) -> bool {
        if self.cop0.cache_isolated() {
            trace!("CPU: store to 0x{:08X} dropped (cache isolated)", addr);
            true
        } else {
            false
        }
    }

    fn address_error_store(&mut self, address: u32) -> Result<()> {
        self.cop0.set_bad_vaddr(address);
        self.exception(ExceptionCause::AddressErrorStore);
        Ok(())
    }

    /// SB: Store Byte
    ///
    /// Format: sb rt, offset(rs)
    pub(crate) fn op_sb(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if self.store_suppressed(addr) {
            return Ok(());
        }
        bus.write8(addr, self.reg(instr.rt()) as u8)
    }

    /// SH: Store Halfword
    pub(crate) fn op_sh(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if addr & 1 != 0 {
            return self.address_error_store(addr);
        }
        if self.store_suppressed(addr) {
            return Ok(());
        }
        bus.write16(addr, self.reg(instr.rt()) as u16)
    }

    /// SW: Store Word
    pub(crate) fn op_sw(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if addr & 3 != 0 {
            return self.address_error_store(addr);
        }
        if self.store_suppressed(addr) {
            return Ok(());
        }
        bus.write32(addr, self.reg(instr.rt()))
    }

    /// SWL: Store Word Left
    ///
    /// Writes the high bytes of rt into the low end of the aligned word.
    pub(crate) fn op_swl(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if self.store_suppressed(addr) {
            return Ok(());
        }
        let aligned = addr & !3;
        let mem = bus.read32(aligned)?;
        let value = self.reg(instr.rt());

        let merged = match addr & 3 {
            0 => (mem & 0xFFFF_FF00) | (value >> 24),
            1 => (mem & 0xFFFF_0000) | (value >> 16),
            2 => (mem & 0xFF00_0000) | (value >> 8),
            _ => value,
        };
        bus.write32(aligned, merged)
    }

    /// SWR: Store Word Right
    ///
    /// Writes the low bytes of rt into the high end of the aligned word.
    pub(crate) fn op_swr(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if self.store_suppressed(addr) {
            return Ok(());
        }
        let aligned = addr & !3;
        let mem = bus.read32(aligned)?;
        let value = self.reg(instr.rt());

        let merged = match addr & 3 {
            0 => value,
            1 => (mem & 0x0000_00FF) | (value << 8),
            2 => (mem & 0x0000_FFFF) | (value << 16),
            _ => (mem & 0x00FF_FFFF) | (value << 24),
        };
        bus.write32(aligned, merged)
    }
}
