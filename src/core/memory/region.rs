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

//! Memory region identification and address translation
//!
//! The R3000A has no MMU on this machine. KUSEG, KSEG0 and KSEG1 all mirror
//! the same 512MB physical space, so translation is a mask of the top three
//! bits. KSEG2 does not mirror anything: only the cache control register
//! lives there, and every other KSEG2 address is unmapped.

use super::Bus;

/// Memory region identification
///
/// Every physical address decodes to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Main RAM (2MB, mirrored 4 times over 8MB)
    RAM,
    /// Auxiliary static RAM (expansion region 1, 1MB)
    SRAM,
    /// CPU-visible window onto GPU VRAM (1MB)
    VRAM,
    /// Scratchpad (1KB)
    Scratchpad,
    /// I/O ports
    IO,
    /// BIOS ROM
    BIOS,
    /// Cache Control register
    CacheControl,
    /// Unmapped region
    Unmapped,
}

impl Bus {
    pub(super) const RAM_START: u32 = 0x0000_0000;
    pub(super) const RAM_END: u32 = 0x007F_FFFF;

    pub(super) const SRAM_START: u32 = 0x1F00_0000;
    pub(super) const SRAM_END: u32 = 0x1F0F_FFFF;

    pub(super) const VRAM_START: u32 = 0x1F40_0000;
    pub(super) const VRAM_END: u32 = 0x1F4F_FFFF;

    pub(super) const SCRATCHPAD_START: u32 = 0x1F80_0000;
    pub(super) const SCRATCHPAD_END: u32 = 0x1F80_03FF;

    pub(super) const IO_START: u32 = 0x1F80_1000;
    pub(super) const IO_END: u32 = 0x1F80_2FFF;

    pub(super) const BIOS_START: u32 = 0x1FC0_0000;
    pub(super) const BIOS_END: u32 = 0x1FC7_FFFF;

    pub(super) const CACHE_CONTROL: u32 = 0x1FFE_0130;
    pub(super) const CACHE_CONTROL_END: u32 = 0x1FFE_0133;

    const KSEG2_START: u32 = 0xC000_0000;
    const KSEG2_CACHE_CONTROL: u32 = 0xFFFE_0130;
    /// Physical address no region claims
    const NOWHERE: u32 = 0xFFFF_FFFF;

    /// Translate virtual address to physical address
    ///
    /// - 0x00001234 (KUSEG) → 0x00001234
    /// - 0x80001234 (KSEG0) → 0x00001234
    /// - 0xA0001234 (KSEG1) → 0x00001234
    /// - 0xFFFE0130 (KSEG2) → 0x1FFE0130
    /// - any other KSEG2 address → an unmapped physical address
    #[inline(always)]
    pub(super) fn translate_address(vaddr: u32) -> u32 {
        if vaddr < Self::KSEG2_START {
            vaddr & 0x1FFF_FFFF
        } else if vaddr & !0x3 == Self::KSEG2_CACHE_CONTROL {
            Self::CACHE_CONTROL | (vaddr & 0x3)
        } else {
            Self::NOWHERE
        }
    }

    /// Identify memory region for an address
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    ///
    /// assert_eq!(bus.identify_region(0x00000000), MemoryRegion::RAM);
    /// assert_eq!(bus.identify_region(0x80600000), MemoryRegion::RAM);
    /// assert_eq!(bus.identify_region(0x1F000000), MemoryRegion::SRAM);
    /// assert_eq!(bus.identify_region(0x1F800000), MemoryRegion::Scratchpad);
    /// assert_eq!(bus.identify_region(0x1F801000), MemoryRegion::IO);
    /// assert_eq!(bus.identify_region(0xBFC00000), MemoryRegion::BIOS);
    /// assert_eq!(bus.identify_region(0x1FFFFFFF), MemoryRegion::Unmapped);
    /// assert_eq!(bus.identify_region(0xC0000000), MemoryRegion::Unmapped);
    /// ```
    pub fn identify_region(&self, vaddr: u32) -> MemoryRegion {
        Self::region_of(Self::translate_address(vaddr))
    }

    pub(super) fn region_of(paddr: u32) -> MemoryRegion {
        match paddr {
            Self::RAM_START..=Self::RAM_END => MemoryRegion::RAM,
            Self::SRAM_START..=Self::SRAM_END => MemoryRegion::SRAM,
            Self::VRAM_START..=Self::VRAM_END => MemoryRegion::VRAM,
            Self::SCRATCHPAD_START..=Self::SCRATCHPAD_END => MemoryRegion::Scratchpad,
            Self::IO_START..=Self::IO_END => MemoryRegion::IO,
            Self::BIOS_START..=Self::BIOS_END => MemoryRegion::BIOS,
            Self::CACHE_CONTROL..=Self::CACHE_CONTROL_END => MemoryRegion::CacheControl,
            _ => MemoryRegion::Unmapped,
        }
    }
}
