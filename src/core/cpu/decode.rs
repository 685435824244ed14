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

//! Instruction field decoding
//!
//! MIPS I uses three encodings that share field positions:
//!
//! ```text
//! R-type: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
//! I-type: | op (6) | rs (5) | rt (5) |        immediate (16)        |
//! J-type: | op (6) |               target (26)                     |
//! ```
//!
//! [`Instruction`] wraps the raw word and extracts each field on demand, so
//! handlers name the fields they use instead of destructuring tuples.

/// A raw 32-bit instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Primary opcode, bits 26-31
    #[inline(always)]
    pub fn op(self) -> u32 {
        self.0 >> 26
    }

    /// Source register, bits 21-25
    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    /// Target register, bits 16-20
    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    /// Destination register, bits 11-15
    #[inline(always)]
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    /// Shift amount, bits 6-10
    #[inline(always)]
    pub fn shamt(self) -> u32 {
        (self.0 >> 6) & 0x1F
    }

    /// SPECIAL function code, bits 0-5
    #[inline(always)]
    pub fn funct(self) -> u32 {
        self.0 & 0x3F
    }

    /// Zero-extended 16-bit immediate
    #[inline(always)]
    pub fn imm(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Sign-extended 16-bit immediate
    #[inline(always)]
    pub fn imm_se(self) -> u32 {
        (self.0 as u16) as i16 as i32 as u32
    }

    /// Branch displacement in bytes (sign-extended immediate << 2)
    #[inline(always)]
    pub fn branch_offset(self) -> u32 {
        self.imm_se() << 2
    }

    /// 26-bit jump target field
    #[inline(always)]
    pub fn target(self) -> u32 {
        self.0 & 0x03FF_FFFF
    }

    /// Coprocessor sub-opcode, bits 21-25 (same position as rs)
    #[inline(always)]
    pub fn cop_op(self) -> u32 {
        (self.0 >> 21) & 0x1F
    }

    /// Coprocessor number encoded in COPz/LWCz/SWCz opcodes
    #[inline(always)]
    pub fn cop_number(self) -> u32 {
        self.op() & 0x3
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Self(word)
    }
}
