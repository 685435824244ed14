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

//! Custom assertions for engine tests

use xsp::core::cpu::CPU;
use xsp::core::memory::Bus;

/// Assert CPU register has expected value
#[allow(dead_code)]
pub fn assert_cpu_reg(cpu: &CPU, reg: u8, expected: u32) {
    let actual = cpu.reg(reg);
    assert_eq!(
        actual, expected,
        "Register ${} mismatch: expected 0x{:08X}, got 0x{:08X}",
        reg, expected, actual
    );
}

/// Assert memory contains expected value at address
#[allow(dead_code)]
pub fn assert_memory_word(bus: &mut Bus, addr: u32, expected: u32) {
    let actual = bus.read32(addr).expect("Failed to read memory");
    assert_eq!(
        actual, expected,
        "Memory at 0x{:08X} mismatch: expected 0x{:08X}, got 0x{:08X}",
        addr, expected, actual
    );
}

/// Assert VRAM pixel has expected color
#[allow(dead_code)]
pub fn assert_vram_pixel(gpu: &xsp::core::gpu::GPU, x: u16, y: u16, expected: u16) {
    let actual = gpu.read_vram(x, y);
    assert_eq!(
        actual, expected,
        "VRAM at ({}, {}) mismatch: expected 0x{:04X}, got 0x{:04X}",
        x, y, expected, actual
    );
}

/// Assert `pc` points into readable memory
#[allow(dead_code)]
pub fn assert_pc_mapped(bus: &Bus, pc: u32) {
    assert!(
        bus.peek32(pc).is_some(),
        "PC left mapped memory: 0x{:08X}",
        pc
    );
}

/// Assert an I_STAT bit state
#[allow(dead_code)]
pub fn assert_irq(bus: &Bus, bit: u16, expected: bool) {
    let status = bus.interrupt_controller().read_status();
    assert_eq!(
        status & bit as u32 != 0,
        expected,
        "I_STAT bit 0x{:04X} expected {}, I_STAT=0x{:04X}",
        bit,
        expected,
        status
    );
}
