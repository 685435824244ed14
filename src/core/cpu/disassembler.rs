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

//! MIPS instruction disassembler for debugging
//!
//! Converts instruction words to assembly text for traces and logs. Branch
//! and jump targets are printed as absolute addresses, which is why the
//! instruction's own address is needed.

use super::decode::Instruction;

/// Instruction disassembler
///
/// # Example
/// ```
/// use xsp::core::cpu::Disassembler;
///
/// let disasm = Disassembler::disassemble(0x0000_0000, 0xBFC0_0000);
/// assert_eq!(disasm, "nop");
/// ```
pub struct Disassembler;

impl Disassembler {
    /// Disassemble a single instruction
    ///
    /// # Arguments
    ///
    /// * `word` - The 32-bit instruction
    /// * `pc` - Address of the instruction
    ///
    /// # Example
    /// ```
    /// use xsp::core::cpu::Disassembler;
    ///
    /// assert_eq!(Disassembler::disassemble(0x3C01_1234, 0xBFC0_0000), "lui r1, 0x1234");
    /// assert_eq!(
    ///     Disassembler::disassemble(0x1000_0003, 0xBFC0_0000),
    ///     "beq r0, r0, 0xBFC00010"
    /// );
    /// ```
    pub fn disassemble(word: u32, pc: u32) -> String {
        let i = Instruction(word);
        let branch_target = pc.wrapping_add(4).wrapping_add(i.branch_offset());
        let jump_target = (pc.wrapping_add(4) & 0xF000_0000) | (i.target() << 2);

        match i.op() {
            0x00 => Self::disasm_special(i),
            0x01 => Self::disasm_regimm(i, branch_target),
            0x02 => format!("j 0x{:08X}", jump_target),
            0x03 => format!("jal 0x{:08X}", jump_target),
            0x04 => format!("beq r{}, r{}, 0x{:08X}", i.rs(), i.rt(), branch_target),
            0x05 => format!("bne r{}, r{}, 0x{:08X}", i.rs(), i.rt(), branch_target),
            0x06 => format!("blez r{}, 0x{:08X}", i.rs(), branch_target),
            0x07 => format!("bgtz r{}, 0x{:08X}", i.rs(), branch_target),
            0x08 => Self::imm_signed("addi", i),
            0x09 => Self::imm_signed("addiu", i),
            0x0A => Self::imm_signed("slti", i),
            0x0B => Self::imm_signed("sltiu", i),
            0x0C => Self::imm_hex("andi", i),
            0x0D => Self::imm_hex("ori", i),
            0x0E => Self::imm_hex("xori", i),
            0x0F => format!("lui r{}, 0x{:04X}", i.rt(), i.imm()),
            0x10 => Self::disasm_cop0(i),
            0x11 | 0x12 | 0x13 => format!("cop{} 0x{:07X}", i.cop_number(), word & 0x01FF_FFFF),
            0x20 => Self::mem("lb", i),
            0x21 => Self::mem("lh", i),
            0x22 => Self::mem("lwl", i),
            0x23 => Self::mem("lw", i),
            0x24 => Self::mem("lbu", i),
            0x25 => Self::mem("lhu", i),
            0x26 => Self::mem("lwr", i),
            0x28 => Self::mem("sb", i),
            0x29 => Self::mem("sh", i),
            0x2A => Self::mem("swl", i),
            0x2B => Self::mem("sw", i),
            0x2E => Self::mem("swr", i),
            0x30..=0x33 => format!(
                "lwc{} ${}, {}(r{})",
                i.cop_number(),
                i.rt(),
                i.imm_se() as i32,
                i.rs()
            ),
            0x38..=0x3B => format!(
                "swc{} ${}, {}(r{})",
                i.cop_number(),
                i.rt(),
                i.imm_se() as i32,
                i.rs()
            ),
            _ => format!("??? 0x{:08X}", word),
        }
    }

    fn imm_signed(name: &str, i: Instruction) -> String {
        format!("{} r{}, r{}, {}", name, i.rt(), i.rs(), i.imm_se() as i32)
    }

    fn imm_hex(name: &str, i: Instruction) -> String {
        format!("{} r{}, r{}, 0x{:04X}", name, i.rt(), i.rs(), i.imm())
    }

    fn mem(name: &str, i: Instruction) -> String {
        format!("{} r{}, {}(r{})", name, i.rt(), i.imm_se() as i32, i.rs())
    }

    fn disasm_special(i: Instruction) -> String {
        let (rs, rt, rd) = (i.rs(), i.rt(), i.rd());
        let three = |name: &str| format!("{} r{}, r{}, r{}", name, rd, rs, rt);
        let shift = |name: &str| format!("{} r{}, r{}, {}", name, rd, rt, i.shamt());
        let shiftv = |name: &str| format!("{} r{}, r{}, r{}", name, rd, rt, rs);

        match i.funct() {
            0x00 if i.0 == 0 => "nop".to_string(),
            0x00 => shift("sll"),
            0x02 => shift("srl"),
            0x03 => shift("sra"),
            0x04 => shiftv("sllv"),
            0x06 => shiftv("srlv"),
            0x07 => shiftv("srav"),
            0x08 => format!("jr r{}", rs),
            0x09 => format!("jalr r{}, r{}", rd, rs),
            0x0C => format!("syscall 0x{:05X}", (i.0 >> 6) & 0xF_FFFF),
            0x0D => format!("break 0x{:05X}", (i.0 >> 6) & 0xF_FFFF),
            0x10 => format!("mfhi r{}", rd),
            0x11 => format!("mthi r{}", rs),
            0x12 => format!("mflo r{}", rd),
            0x13 => format!("mtlo r{}", rs),
            0x18 => format!("mult r{}, r{}", rs, rt),
            0x19 => format!("multu r{}, r{}", rs, rt),
            0x1A => format!("div r{}, r{}", rs, rt),
            0x1B => format!("divu r{}, r{}", rs, rt),
            0x20 => three("add"),
            0x21 => three("addu"),
            0x22 => three("sub"),
            0x23 => three("subu"),
            0x24 => three("and"),
            0x25 => three("or"),
            0x26 => three("xor"),
            0x27 => three("nor"),
            0x2A => three("slt"),
            0x2B => three("sltu"),
            _ => format!("??? 0x{:08X}", i.0),
        }
    }

    fn disasm_regimm(i: Instruction, target: u32) -> String {
        let rt = i.rt();
        let name = match (rt & 1 != 0, (rt & 0x1E) == 0x10) {
            (false, false) => "bltz",
            (true, false) => "bgez",
            (false, true) => "bltzal",
            (true, true) => "bgezal",
        };
        format!("{} r{}, 0x{:08X}", name, i.rs(), target)
    }

    fn disasm_cop0(i: Instruction) -> String {
        match i.cop_op() {
            0x00 => format!("mfc0 r{}, cop0r{}", i.rt(), i.rd()),
            0x04 => format!("mtc0 r{}, cop0r{}", i.rt(), i.rd()),
            0x10 if i.funct() == 0x10 => "rfe".to_string(),
            _ => format!("??? 0x{:08X}", i.0),
        }
    }
}
