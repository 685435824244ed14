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

//! Load instructions
//!
//! Every load goes through the one-slot load delay: the value becomes
//! visible after the next instruction executes. Misaligned halfword and
//! word loads raise AddressErrorLoad with BadVaddr set.

use super::super::decode::Instruction;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    /// Effective address rs + sign_extend(imm)
    #[inline(always)]
    pub(super) fn effective_address(&self, instr: Instruction) -> u32 {
        self.reg(instr.rs()).wrapping_add(instr.imm_se())
    }

    fn address_error_load(&mut self, address: u32) -> Result<()> {
        self.cop0.set_bad_vaddr(address);
        self.exception(ExceptionCause::AddressErrorLoad);
        Ok(())
    }

    /// LB: Load Byte (sign-extended)
    ///
    /// Format: lb rt, offset(rs)
    pub(crate) fn op_lb(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let value = bus.read8(addr)? as i8 as i32 as u32;
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LBU: Load Byte Unsigned
    pub(crate) fn op_lbu(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let value = bus.read8(addr)? as u32;
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LH: Load Halfword (sign-extended)
    pub(crate) fn op_lh(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if addr & 1 != 0 {
            return self.address_error_load(addr);
        }
        let value = bus.read16(addr)? as i16 as i32 as u32;
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LHU: Load Halfword Unsigned
    pub(crate) fn op_lhu(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if addr & 1 != 0 {
            return self.address_error_load(addr);
        }
        let value = bus.read16(addr)? as u32;
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LW: Load Word
    ///
    /// Format: lw rt, offset(rs)
    ///
    /// # Example
    ///
    /// ```text
    /// lw   r2, 0(r1)
    /// addu r3, r2, r0   // still sees the old r2
    /// addu r4, r2, r0   // sees the loaded value
    /// ```
    pub(crate) fn op_lw(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        if addr & 3 != 0 {
            return self.address_error_load(addr);
        }
        let value = bus.read32(addr)?;
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LWL: Load Word Left
    ///
    /// Loads the most significant bytes of an unaligned word into the high
    /// end of rt. Paired with LWR to read a full unaligned word:
    ///
    /// ```text
    /// lwl r1, 3(r2)
    /// lwr r1, 0(r2)
    /// ```
    ///
    /// The merge base is the in-flight load value when the previous
    /// instruction loaded the same register, which is what makes the pair
    /// work back to back.
    pub(crate) fn op_lwl(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let word = bus.read32(addr & !3)?;
        let current = self.reg_for_merge(instr.rt());

        let value = match addr & 3 {
            0 => (current & 0x00FF_FFFF) | (word << 24),
            1 => (current & 0x0000_FFFF) | (word << 16),
            2 => (current & 0x0000_00FF) | (word << 8),
            _ => word,
        };
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Loads the least significant bytes of an unaligned word into the low
    /// end of rt.
    pub(crate) fn op_lwr(&mut self, instr: Instruction, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(instr);
        let word = bus.read32(addr & !3)?;
        let current = self.reg_for_merge(instr.rt());

        let value = match addr & 3 {
            0 => word,
            1 => (current & 0xFF00_0000) | (word >> 8),
            2 => (current & 0xFFFF_0000) | (word >> 16),
            _ => (current & 0xFFFF_FF00) | (word >> 24),
        };
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }
}
