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
    // === Branch Instructions ===
    //
    // By the time a branch executes, `self.pc` already points at its delay
    // slot, so the target is `pc + (imm << 2)`. Every branch marks the next
    // instruction as a delay slot whether or not it is taken.

    /// Branch target relative to the delay slot
    #[inline(always)]
    fn branch_target(&self, instr: Instruction) -> u32 {
        self.pc.wrapping_add(instr.branch_offset())
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    pub(crate) fn op_beq(&mut self, instr: Instruction) -> Result<()> {
        let taken = self.reg(instr.rs()) == self.reg(instr.rt());
        self.branch_to(self.branch_target(instr), taken);
        Ok(())
    }

    /// BNE: Branch on Not Equal
    ///
    /// Format: bne rs, rt, offset
    pub(crate) fn op_bne(&mut self, instr: Instruction) -> Result<()> {
        let taken = self.reg(instr.rs()) != self.reg(instr.rt());
        self.branch_to(self.branch_target(instr), taken);
        Ok(())
    }

    /// BLEZ: Branch on Less than or Equal to Zero (signed)
    pub(crate) fn op_blez(&mut self, instr: Instruction) -> Result<()> {
        let taken = (self.reg(instr.rs()) as i32) <= 0;
        self.branch_to(self.branch_target(instr), taken);
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero (signed)
    pub(crate) fn op_bgtz(&mut self, instr: Instruction) -> Result<()> {
        let taken = (self.reg(instr.rs()) as i32) > 0;
        self.branch_to(self.branch_target(instr), taken);
        Ok(())
    }

    /// BCONDZ: REGIMM branches (opcode 0x01)
    ///
    /// The rt field selects the condition:
    /// - bit 0: 0 = BLTZ, 1 = BGEZ
    /// - rt & 0x1E == 0x10: link variant (BLTZAL/BGEZAL)
    ///
    /// The link variants write r31 whether or not the branch is taken, and
    /// the hardware decodes every other rt value as plain BLTZ/BGEZ.
    pub(crate) fn op_bcondz(&mut self, instr: Instruction) -> Result<()> {
        let rt = instr.rt();
        let is_bgez = (rt & 1) != 0;
        let link = (rt & 0x1E) == 0x10;

        let negative = (self.reg(instr.rs()) as i32) < 0;
        let taken = negative != is_bgez;

        let target = self.branch_target(instr);
        if link {
            self.set_reg(31, self.next_pc);
        }
        self.branch_to(target, taken);
        Ok(())
    }
}
