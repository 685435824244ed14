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
    /// MFC0: Move From Coprocessor 0
    ///
    /// Format: mfc0 rt, rd
    ///
    /// The result goes through the load delay like a memory load.
    pub(crate) fn op_mfc0(&mut self, instr: Instruction) -> Result<()> {
        let value = self.cop0.read(instr.rd());
        self.set_reg_delayed(instr.rt(), value, instr.op());
        Ok(())
    }

    /// MTC0: Move To Coprocessor 0
    ///
    /// Format: mtc0 rt, rd
    ///
    /// Unmasking a pending interrupt through SR takes effect at the next
    /// instruction boundary.
    pub(crate) fn op_mtc0(&mut self, instr: Instruction) -> Result<()> {
        let value = self.reg(instr.rt());
        log::trace!("MTC0: cop0r{} = 0x{:08X}", instr.rd(), value);
        self.cop0.write(instr.rd(), value);
        Ok(())
    }

    /// RFE: Restore From Exception
    ///
    /// Pops the KU/IE mode stack. The return jump itself is the `jr` whose
    /// delay slot holds this instruction.
    pub(crate) fn op_rfe(&mut self, _instr: Instruction) -> Result<()> {
        self.cop0.return_from_exception();
        Ok(())
    }
}
