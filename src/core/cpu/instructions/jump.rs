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

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Jump Instructions ===

    /// J: Jump
    ///
    /// The 26-bit target replaces bits 27:2 of the delay slot address.
    ///
    /// Format: j target
    pub(crate) fn op_j(&mut self, instr: Instruction) -> Result<()> {
        let target = (self.pc & 0xF000_0000) | (instr.target() << 2);
        self.branch_to(target, true);
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// Stores the address after the delay slot in r31, then jumps.
    ///
    /// Format: jal target
    pub(crate) fn op_jal(&mut self, instr: Instruction) -> Result<()> {
        let target = (self.pc & 0xF000_0000) | (instr.target() << 2);
        self.set_reg(31, self.next_pc);
        self.branch_to(target, true);
        Ok(())
    }

    /// JR: Jump Register
    ///
    /// A misaligned target faults when it is fetched, not here.
    pub(crate) fn op_jr(&mut self, instr: Instruction) -> Result<()> {
        let target = self.reg(instr.rs());
        self.branch_to(target, true);
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// Format: jalr rd, rs
    ///
    /// The target is read before rd is written, so `jalr r31, r31` behaves.
    pub(crate) fn op_jalr(&mut self, instr: Instruction) -> Result<()> {
        let target = self.reg(instr.rs());
        self.set_reg(instr.rd(), self.next_pc);
        self.branch_to(target, true);
        Ok(())
    }
}
