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

//! CPU test modules
//!
//! - `basic`: initialization, reset, register access, state export
//! - `decode`: instruction field extraction
//! - `load_delay`: the one-slot load delay and its interactions
//! - `branch_delay`: branch/jump delay slots and link registers
//! - `instructions`: ALU, multiply/divide and memory instruction results
//! - `exceptions`: exception entry, vectors, faults and interrupts
//! - `cop0`: MFC0/MTC0/RFE and register masking

mod basic;
mod exceptions;

use super::CPU;
use crate::core::memory::Bus;

/// Where test programs are placed (KSEG0 work RAM)
pub(super) const CODE: u32 = 0x8000_1000;

/// Data area used by load/store tests
pub(super) const DATA: u32 = 0x8000_0100;

/// Place `program` at [`CODE`] and point the CPU at it
pub(super) fn setup(program: &[u32]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    for (i, &word) in program.iter().enumerate() {
        bus.write32(CODE + 4 * i as u32, word).unwrap();
    }
    let mut cpu = CPU::new();
    cpu.set_pc(CODE);
    (cpu, bus)
}

pub(super) fn run(cpu: &mut CPU, bus: &mut Bus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).unwrap();
    }
}

/// ExcCode field of CAUSE
pub(super) fn exc_code(cpu: &CPU) -> u32 {
    (cpu.cop0_reg(13) >> 2) & 0x1F
}

/// Minimal assembler for test programs
pub(super) mod asm {
    pub fn i_type(op: u32, rs: u32, rt: u32, imm: i32) -> u32 {
        (op << 26) | (rs << 21) | (rt << 16) | (imm as u32 & 0xFFFF)
    }

    pub fn r_type(funct: u32, rs: u32, rt: u32, rd: u32, shamt: u32) -> u32 {
        (rs << 21) | (rt << 16) | (rd << 11) | (shamt << 6) | funct
    }

    pub fn nop() -> u32 {
        0
    }

    pub fn addiu(rt: u32, rs: u32, imm: i32) -> u32 {
        i_type(0x09, rs, rt, imm)
    }

    pub fn addi(rt: u32, rs: u32, imm: i32) -> u32 {
        i_type(0x08, rs, rt, imm)
    }

    pub fn lui(rt: u32, imm: u32) -> u32 {
        i_type(0x0F, 0, rt, imm as i32)
    }

    pub fn ori(rt: u32, rs: u32, imm: u32) -> u32 {
        i_type(0x0D, rs, rt, imm as i32)
    }

    pub fn addu(rd: u32, rs: u32, rt: u32) -> u32 {
        r_type(0x21, rs, rt, rd, 0)
    }

    pub fn add(rd: u32, rs: u32, rt: u32) -> u32 {
        r_type(0x20, rs, rt, rd, 0)
    }

    pub fn lw(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x23, base, rt, offset)
    }

    pub fn lb(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x20, base, rt, offset)
    }

    pub fn lwl(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x22, base, rt, offset)
    }

    pub fn lwr(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x26, base, rt, offset)
    }

    pub fn sw(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x2B, base, rt, offset)
    }

    pub fn swl(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x2A, base, rt, offset)
    }

    pub fn swr(rt: u32, offset: i32, base: u32) -> u32 {
        i_type(0x2E, base, rt, offset)
    }

    /// Branch offsets are in instructions, relative to the delay slot
    pub fn beq(rs: u32, rt: u32, offset: i32) -> u32 {
        i_type(0x04, rs, rt, offset)
    }

    pub fn bne(rs: u32, rt: u32, offset: i32) -> u32 {
        i_type(0x05, rs, rt, offset)
    }

    pub fn regimm(rt: u32, rs: u32, offset: i32) -> u32 {
        i_type(0x01, rs, rt, offset)
    }

    pub fn j(target: u32) -> u32 {
        (0x02 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }

    pub fn jal(target: u32) -> u32 {
        (0x03 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }

    pub fn jr(rs: u32) -> u32 {
        r_type(0x08, rs, 0, 0, 0)
    }

    pub fn jalr(rd: u32, rs: u32) -> u32 {
        r_type(0x09, rs, 0, rd, 0)
    }

    pub fn syscall() -> u32 {
        0x0000_000C
    }

    pub fn mfc0(rt: u32, rd: u32) -> u32 {
        (0x10 << 26) | (rt << 16) | (rd << 11)
    }

    pub fn mtc0(rt: u32, rd: u32) -> u32 {
        (0x10 << 26) | (0x04 << 21) | (rt << 16) | (rd << 11)
    }

    pub fn rfe() -> u32 {
        0x4200_0010
    }
}
