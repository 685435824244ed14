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

//! CPU instruction implementations
//!
//! This module contains all MIPS R3000A instruction implementations,
//! organized by instruction type. Every handler takes the decoded
//! [`Instruction`] and returns `Result<()>`; bus errors propagate with `?`
//! and are turned into exceptions by [`CPU::step`].

use super::decode::Instruction;
use super::CPU;
use crate::core::error::Result;
use crate::core::memory::Bus;

// Instruction modules organized by type
mod arithmetic;
mod branch;
mod cop0;
mod cop2;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

impl CPU {
    /// Decode and execute the current instruction
    ///
    /// Dispatches on the primary opcode (upper 6 bits). Unassigned opcodes
    /// raise ReservedInstruction.
    pub(super) fn execute_instruction(&mut self, bus: &mut Bus) -> Result<()> {
        let instr = Instruction(self.current_instruction);

        match instr.op() {
            0x00 => self.execute_special(instr),
            0x01 => self.op_bcondz(instr),
            0x02 => self.op_j(instr),
            0x03 => self.op_jal(instr),
            0x04 => self.op_beq(instr),
            0x05 => self.op_bne(instr),
            0x06 => self.op_blez(instr),
            0x07 => self.op_bgtz(instr),
            0x08 => self.op_addi(instr),
            0x09 => self.op_addiu(instr),
            0x0A => self.op_slti(instr),
            0x0B => self.op_sltiu(instr),
            0x0C => self.op_andi(instr),
            0x0D => self.op_ori(instr),
            0x0E => self.op_xori(instr),
            0x0F => self.op_lui(instr),
            0x10 => self.execute_cop0(instr),
            0x11 | 0x13 => self.op_cop_unusable(instr),
            0x12 => self.op_cop2(instr),
            0x20 => self.op_lb(instr, bus),
            0x21 => self.op_lh(instr, bus),
            0x22 => self.op_lwl(instr, bus),
            0x23 => self.op_lw(instr, bus),
            0x24 => self.op_lbu(instr, bus),
            0x25 => self.op_lhu(instr, bus),
            0x26 => self.op_lwr(instr, bus),
            0x28 => self.op_sb(instr, bus),
            0x29 => self.op_sh(instr, bus),
            0x2A => self.op_swl(instr, bus),
            0x2B => self.op_sw(instr, bus),
            0x2E => self.op_swr(instr, bus),
            0x30 | 0x31 | 0x33 | 0x38 | 0x39 | 0x3B => self.op_cop_unusable(instr),
            0x32 => self.op_lwc2(instr),
            0x3A => self.op_swc2(instr),
            _ => self.op_reserved(instr),
        }
    }

    /// Handle SPECIAL instructions (opcode 0x00)
    ///
    /// SPECIAL instructions use the lower 6 bits (funct field) to determine
    /// the specific operation.
    fn execute_special(&mut self, instr: Instruction) -> Result<()> {
        match instr.funct() {
            0x00 => self.op_sll(instr),
            0x02 => self.op_srl(instr),
            0x03 => self.op_sra(instr),
            0x04 => self.op_sllv(instr),
            0x06 => self.op_srlv(instr),
            0x07 => self.op_srav(instr),
            0x08 => self.op_jr(instr),
            0x09 => self.op_jalr(instr),
            0x0C => self.op_syscall(instr),
            0x0D => self.op_break(instr),
            0x10 => self.op_mfhi(instr),
            0x11 => self.op_mthi(instr),
            0x12 => self.op_mflo(instr),
            0x13 => self.op_mtlo(instr),
            0x18 => self.op_mult(instr),
            0x19 => self.op_multu(instr),
            0x1A => self.op_div(instr),
            0x1B => self.op_divu(instr),
            0x20 => self.op_add(instr),
            0x21 => self.op_addu(instr),
            0x22 => self.op_sub(instr),
            0x23 => self.op_subu(instr),
            0x24 => self.op_and(instr),
            0x25 => self.op_or(instr),
            0x26 => self.op_xor(instr),
            0x27 => self.op_nor(instr),
            0x2A => self.op_slt(instr),
            0x2B => self.op_sltu(instr),
            _ => self.op_reserved(instr),
        }
    }

    /// Handle COP0 instructions (opcode 0x10)
    ///
    /// COP0 is always usable in kernel mode; user mode needs SR.CU0.
    fn execute_cop0(&mut self, instr: Instruction) -> Result<()> {
        if self.cop0.user_mode() && !self.cop0.coprocessor_enabled(0) {
            self.coprocessor_unusable(0);
            return Ok(());
        }

        match instr.cop_op() {
            0x00 => self.op_mfc0(instr),
            0x04 => self.op_mtc0(instr),
            0x10 if instr.funct() == 0x10 => self.op_rfe(instr),
            _ => self.op_reserved(instr),
        }
    }

    /// Any opcode this CPU does not implement
    fn op_reserved(&mut self, instr: Instruction) -> Result<()> {
        log::warn!(
            "Reserved instruction 0x{:08X} at PC=0x{:08X}",
            instr.0,
            self.current_pc
        );
        self.exception(super::ExceptionCause::ReservedInstruction);
        Ok(())
    }
}
