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

//! System test modules
//!
//! - `basic`: construction, reset, BIOS loading
//! - `execution`: stepping and tracing
//! - `tick`: communications gate, tick budget and raster
//! - `putchar`: BIOS TTY capture into the overlay
//! - `dma`: GPU DMA through the bus (interrupt visibility)
//! - `bios`: runs against a real BIOS (ignored by default)

mod dma;

use super::System;
use crate::core::config::Config;

/// Size of a BIOS image
pub(super) const BIOS_SIZE: usize = 512 * 1024;

/// Build a BIOS image with `program` at the reset vector
pub(super) fn rom_with(program: &[u32]) -> Vec<u8> {
    let mut rom = vec![0u8; BIOS_SIZE];
    for (i, word) in program.iter().enumerate() {
        rom[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    rom
}

/// BIOS that spins at the reset vector
pub(super) fn idle_rom() -> Vec<u8> {
    rom_with(&[asm::j(0xBFC0_0000), asm::NOP])
}

/// System running [`idle_rom`] with the communications flag set
pub(super) fn booted(config: &Config) -> System {
    let mut system = System::with_config(config);
    system.load_bios_bytes(&idle_rom()).unwrap();
    system.set_comms(1);
    system
}

/// Minimal encoders for the few instructions the tests need
pub(super) mod asm {
    pub const NOP: u32 = 0;

    pub fn j(target: u32) -> u32 {
        (0x02 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }

    pub fn lui(rt: u32, imm: u16) -> u32 {
        (0x0F << 26) | (rt << 16) | imm as u32
    }

    pub fn ori(rt: u32, rs: u32, imm: u16) -> u32 {
        (0x0D << 26) | (rs << 21) | (rt << 16) | imm as u32
    }

    pub fn sw(rt: u32, offset: i16, base: u32) -> u32 {
        (0x2B << 26) | (base << 21) | (rt << 16) | (offset as u16) as u32
    }
}
