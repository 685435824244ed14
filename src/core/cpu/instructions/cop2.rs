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

//! Coprocessor 2 and the unused coprocessor slots
//!
//! There is no geometry engine behind COP2. With SR.CU2 clear every COP2
//! access raises CoprocessorUnusable; with it set the instructions retire
//! without effect. COP1, COP3 and their LWCz/SWCz forms always fault.

use log::trace;

use super::super::decode::Instruction;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    /// Fault unless COP2 is enabled
    fn cop2_usable(&mut self) -> bool {
        if self.cop0.coprocessor_enabled(2) {
            true
        } else {
            self.coprocessor_unusable(2);
            false
        }
    }

    /// COP2: any coprocessor 2 operation (opcode 0x12)
    pub(crate) fn op_cop2(&mut self, instr: Instruction) -> Result<()> {
        if self.cop2_usable() {
            trace!("COP2 0x{:08X} ignored at 0x{:08X}", instr.0, self.current_pc);
        }
        Ok(())
    }

    /// LWC2: Load Word to Coprocessor 2
    pub(crate) fn op_lwc2(&mut self, instr: Instruction) -> Result<()> {
        if self.cop2_usable() {
            trace!("LWC2 0x{:08X} ignored at 0x{:08X}", instr.0, self.current_pc);
        }
        Ok(())
    }

    /// SWC2: Store Word from Coprocessor 2
    pub(crate) fn op_swc2(&mut self, instr: Instruction) -> Result<()> {
        if self.cop2_usable() {
            trace!("SWC2 0x{:08X} ignored at 0x{:08X}", instr.0, self.current_pc);
        }
        Ok(())
    }

    /// COP1/COP3, LWC0/1/3, SWC0/1/3
    pub(crate) fn op_cop_unusable(&mut self, instr: Instruction) -> Result<()> {
        self.coprocessor_unusable(instr.cop_number());
        Ok(())
    }
}
