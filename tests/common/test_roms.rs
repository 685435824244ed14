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

//! Synthetic BIOS images and instruction encoders

/// BIOS image size
pub const BIOS_SIZE: usize = 512 * 1024;

/// Offset of the BEV exception vector inside the BIOS
pub const VECTOR_OFFSET: usize = 0x180;

/// Minimal instruction encoders
#[allow(dead_code)]
pub mod asm {
    pub const NOP: u32 = 0;

    fn i_type(op: u32, rs: u32, rt: u32, imm: u16) -> u32 {
        (op << 26) | (rs << 21) | (rt << 16) | imm as u32
    }

    pub fn lui(rt: u32, imm: u16) -> u32 {
        i_type(0x0F, 0, rt, imm)
    }

    pub fn ori(rt: u32, rs: u32, imm: u16) -> u32 {
        i_type(0x0D, rs, rt, imm)
    }

    pub fn addiu(rt: u32, rs: u32, imm: i16) -> u32 {
        i_type(0x09, rs, rt, imm as u16)
    }

    pub fn sw(rt: u32, offset: i16, base: u32) -> u32 {
        i_type(0x2B, base, rt, offset as u16)
    }

    pub fn lw(rt: u32, offset: i16, base: u32) -> u32 {
        i_type(0x23, base, rt, offset as u16)
    }

    pub fn j(target: u32) -> u32 {
        (0x02 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }

    pub fn jr(rs: u32) -> u32 {
        (rs << 21) | 0x08
    }

    pub fn mtc0(rt: u32, rd: u32) -> u32 {
        (0x10 << 26) | (0x04 << 21) | (rt << 16) | (rd << 11)
    }

    pub fn mfc0(rt: u32, rd: u32) -> u32 {
        (0x10 << 26) | (rt << 16) | (rd << 11)
    }

    pub fn rfe() -> u32 {
        0x4200_0010
    }
}

/// Build a BIOS image from `(offset, program)` pieces
pub fn rom_from(pieces: &[(usize, &[u32])]) -> Vec<u8> {
    let mut rom = vec![0u8; BIOS_SIZE];
    for (offset, program) in pieces {
        for (i, word) in program.iter().enumerate() {
            let at = offset + i * 4;
            rom[at..at + 4].copy_from_slice(&word.to_le_bytes());
        }
    }
    rom
}

/// BIOS that spins at the reset vector
#[allow(dead_code)]
pub fn idle_rom() -> Vec<u8> {
    rom_from(&[(0, &[asm::j(0xBFC0_0000), asm::NOP])])
}

/// BIOS that enables VBLANK interrupts and counts in a loop
///
/// Register use:
/// - `r4`: main-loop counter, also stored to RAM word 0
/// - `r6`: number of interrupts serviced
///
/// The handler at the BEV vector acknowledges VBLANK in I_STAT and returns
/// through EPC with RFE in the jump's delay slot.
#[allow(dead_code)]
pub fn interrupt_rom() -> Vec<u8> {
    let reset: &[u32] = &[
        asm::lui(1, 0x0040),
        asm::ori(1, 1, 0x0401), // SR = BEV | IM2 | IEc
        asm::lui(2, 0x1F80),
        asm::ori(3, 0, 1),
        asm::sw(3, 0x1074, 2), // I_MASK = VBLANK
        asm::mtc0(1, 12),
        // loop (0xBFC00018)
        asm::addiu(4, 4, 1),
        asm::sw(4, 0, 0),
        asm::j(0xBFC0_0018),
        asm::NOP,
    ];
    let handler: &[u32] = &[
        asm::lui(26, 0x1F80),
        asm::ori(27, 0, 1),
        asm::sw(27, 0x1070, 26), // acknowledge VBLANK
        asm::addiu(6, 6, 1),
        asm::mfc0(26, 14),
        asm::NOP,
        asm::jr(26),
        asm::rfe(),
    ];
    rom_from(&[(0, reset), (VECTOR_OFFSET, handler)])
}

/// Get BIOS path from the environment
#[allow(dead_code)]
pub fn get_bios_path() -> Option<String> {
    std::env::var("XSP_BIOS_PATH").ok()
}
