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
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;

impl CPU {
    /// SYSCALL: System Call
    ///
    /// Raises a Syscall exception. The call number is passed in registers by
    /// convention; the 20-bit code field is ignored by the hardware.
    pub(crate) fn op_syscall(&mut self, _instr: Instruction) -> Result<()> {
        self.exception(ExceptionCause::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint
    pub(crate) fn op_break(&mut self, _instr: Instruction) -> Result<()> {
        self.exception(ExceptionCause::Breakpoint);
        Ok(())
    }
}
