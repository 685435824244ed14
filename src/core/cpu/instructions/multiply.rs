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

//! Multiply/divide unit
//!
//! Results land in HI/LO. Division never traps: the R3000A produces fixed
//! values for a zero divisor and for `i32::MIN / -1`.

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    /// MULT: Multiply (signed)
    ///
    /// Format: mult rs, rt
    /// Operation: (HI, LO) = rs * rt
    pub(crate) fn op_mult(&mut self, instr: Instruction) -> Result<()> {
        let a = self.reg(instr.rs()) as i32 as i64;
        let b = self.reg(instr.rt()) as i32 as i64;
        let result = (a * b) as u64;

        self.hi = (result >> 32) as u32;
        self.lo = result as u32;
        Ok(())
    }

    /// MULTU: Multiply Unsigned
    pub(crate) fn op_multu(&mut self, instr: Instruction) -> Result<()> {
        let a = self.reg(instr.rs()) as u64;
        let b = self.reg(instr.rt()) as u64;
        let result = a * b;

        self.hi = (result >> 32) as u32;
        self.lo = result as u32;
        Ok(())
    }

    /// DIV: Divide (signed)
    ///
    /// Format: div rs, rt
    /// Operation: LO = rs / rt, HI = rs % rt
    ///
    /// | case            | LO                           | HI  |
    /// |-----------------|------------------------------|-----|
    /// | rt == 0, rs >= 0 | 0xFFFFFFFF                  | rs  |
    /// | rt == 0, rs < 0  | 1                           | rs  |
    /// | 0x80000000 / -1 | 0x80000000                   | 0   |
    pub(crate) fn op_div(&mut self, instr: Instruction) -> Result<()> {
        let n = self.reg(instr.rs()) as i32;
        let d = self.reg(instr.rt()) as i32;

        if d == 0 {
            self.hi = n as u32;
            self.lo = if n >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if n == i32::MIN && d == -1 {
            self.hi = 0;
            self.lo = i32::MIN as u32;
        } else {
            self.hi = (n % d) as u32;
            self.lo = (n / d) as u32;
        }
        Ok(())
    }

    /// DIVU: Divide Unsigned
    ///
    /// Division by zero yields LO = 0xFFFFFFFF, HI = rs.
    pub(crate) fn op_divu(&mut self, instr: Instruction) -> Result<()> {
        let n = self.reg(instr.rs());
        let d = self.reg(instr.rt());

        if d == 0 {
            self.hi = n;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = n % d;
            self.lo = n / d;
        }
        Ok(())
    }

    pub(crate) fn op_mfhi(&mut self, instr: Instruction) -> Result<()> {
        self.set_reg(instr.rd(), self.hi);
        Ok(())
    }

    pub(crate) fn op_mthi(&mut self, instr: Instruction) -> Result<()> {
        self.hi = self.reg(instr.rs());
        Ok(())
    }

    pub(crate) fn op_mflo(&mut self, instr: Instruction) -> Result<()> {
        self.set_reg(instr.rd(), self.lo);
        Ok(())
    }

    pub(crate) fn op_mtlo(&mut self, instr: Instruction) -> Result<()> {
        self.lo = self.reg(instr.rs());
        Ok(())
    }
}
