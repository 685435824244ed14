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

//! Test fixtures for common test scenarios

use xsp::core::config::Config;
use xsp::core::memory::Bus;
use xsp::core::system::System;

use super::test_roms;

/// Configuration with a small tick budget so long runs stay fast
#[allow(dead_code)]
pub fn fast_config(instructions_per_tick: u32) -> Config {
    Config {
        instructions_per_tick,
        ..Config::default()
    }
}

/// System with `rom` loaded and the communications flag set
#[allow(dead_code)]
pub fn booted_system(config: &Config, rom: &[u8]) -> System {
    let mut system = System::with_config(config);
    system
        .load_bios_bytes(rom)
        .expect("synthetic ROM has the BIOS size");
    system.set_comms(1);
    system
}

/// System running the interrupt-driven synthetic ROM
#[allow(dead_code)]
pub fn interrupt_rom_system(instructions_per_tick: u32) -> System {
    booted_system(
        &fast_config(instructions_per_tick),
        &test_roms::interrupt_rom(),
    )
}

/// Write `words` to consecutive addresses
#[allow(dead_code)]
pub fn load_words(bus: &mut Bus, start_addr: u32, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        bus.write32(start_addr + (i as u32 * 4), word)
            .expect("Failed to write to memory");
    }
}
