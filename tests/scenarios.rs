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

//! End-to-end scenarios
//!
//! - A: a booted ROM survives long runs with PC always in mapped memory
//! - B: a GP0 fill rectangle lands in VRAM with the fill color
//! - C: GPU DMA completion raises the DMA interrupt only when enabled
//!
//! The real-BIOS variant of A needs `XSP_BIOS_PATH`:
//!
//! ```bash
//! XSP_BIOS_PATH=SCPH1001.BIN cargo test --test scenarios -- --ignored
//! ```

mod common;

use common::assertions::{assert_irq, assert_pc_mapped, assert_vram_pixel};
use common::fixtures::{booted_system, fast_config, interrupt_rom_system, load_words};
use common::test_roms::{get_bios_path, idle_rom};
use xsp::core::dma::ChannelState;
use xsp::core::interrupt::interrupts;
use xsp::core::memory::Bus;
use xsp::core::system::System;

const GP0: u32 = 0x1F80_1810;
const GP1: u32 = 0x1F80_1814;
const DPCR: u32 = 0x1F80_10F0;
const DICR: u32 = 0x1F80_10F4;
const D2_MADR: u32 = 0x1F80_10A0;
const D2_BCR: u32 = 0x1F80_10A4;
const D2_CHCR: u32 = 0x1F80_10A8;

// Scenario A

#[test]
fn scenario_a_million_ticks_stay_mapped() {
    let mut system = interrupt_rom_system(4);

    for _ in 0..1_000_000 {
        system.tick().unwrap();
        assert_pc_mapped(system.bus(), system.pc());
    }

    assert_eq!(system.ticks(), 1_000_000);
    assert!(system.frames() >= 3800);
    // The handler ran once per frame
    let serviced = system.cpu().reg(6) as u64;
    assert!(serviced + 1 >= system.frames() && serviced <= system.frames());
    // The main loop kept running between interrupts
    assert!(system.cpu().reg(4) > 100_000);
}

#[test]
fn scenario_a_every_instruction_stays_mapped() {
    let mut system = interrupt_rom_system(8);

    for _ in 0..5_000 {
        for _ in 0..8 {
            system.step().unwrap();
            assert_pc_mapped(system.bus(), system.pc());
        }
        // Drive the raster by hand so interrupts arrive between steps
        if system.bus_mut().gpu_mut().tick_line() {
            system
                .bus_mut()
                .interrupt_controller_mut()
                .request(interrupts::VBLANK);
        }
    }
    assert!(system.cpu().reg(6) > 0);
}

#[test]
#[ignore]
fn scenario_a_real_bios_million_ticks() {
    let Some(path) = get_bios_path() else {
        eprintln!("XSP_BIOS_PATH not set, skipping");
        return;
    };
    let mut system = System::new();
    system.load_bios(&path).expect("Failed to load BIOS");
    system.set_comms(1);

    for tick in 0..1_000_000u64 {
        system.tick().unwrap();
        assert_pc_mapped(system.bus(), system.pc());
        if tick % 100_000 == 0 {
            println!("tick {} | PC: 0x{:08X}", tick, system.pc());
        }
    }
}

// Scenario B

fn fill(bus: &mut Bus, color: u32, x: u32, y: u32, w: u32, h: u32) {
    bus.write32(GP0, 0x0200_0000 | color).unwrap();
    bus.write32(GP0, (y << 16) | x).unwrap();
    bus.write32(GP0, (h << 16) | w).unwrap();
}

#[test]
fn scenario_b_fill_rectangle() {
    let mut system = booted_system(&fast_config(1), &idle_rom());
    let bus = system.bus_mut();

    // Pure green: 0x00FF00 -> RGB555 0x03E0
    fill(bus, 0x00_FF00, 32, 100, 48, 20);

    let gpu = system.gpu();
    for y in 100..120 {
        for x in 32..80 {
            assert_vram_pixel(gpu, x, y, 0x03E0);
        }
    }
    assert_vram_pixel(gpu, 31, 100, 0);
    assert_vram_pixel(gpu, 80, 100, 0);
    assert_vram_pixel(gpu, 32, 120, 0);
}

#[test]
fn scenario_b_fill_read_back_through_gpuread() {
    let mut system = booted_system(&fast_config(1), &idle_rom());
    let bus = system.bus_mut();
    fill(bus, 0x00_0000FF, 0, 0, 16, 2);

    // GP0(C0h): copy a 4×2 block to the CPU
    bus.write32(GP0, 0xC000_0000).unwrap();
    bus.write32(GP0, 0).unwrap();
    bus.write32(GP0, (2 << 16) | 4).unwrap();

    for _ in 0..4 {
        assert_eq!(bus.read32(GP0).unwrap(), 0x001F_001F);
    }
}

#[test]
fn scenario_b_fill_from_guest_code() {
    use common::test_roms::{asm, rom_from};

    let rom = rom_from(&[(
        0,
        &[
            asm::lui(1, 0x1F80),
            asm::lui(2, 0x027C),   // GP0(02h), blue 0x7C0000
            asm::sw(2, 0x1810, 1),
            asm::lui(2, 0x0010),   // y = 16, x = 0
            asm::sw(2, 0x1810, 1),
            asm::lui(2, 0x0001),   // h = 1
            asm::ori(2, 2, 0x0010), // w = 16
            asm::sw(2, 0x1810, 1),
            asm::j(0xBFC0_0020),
            asm::NOP,
        ],
    )]);
    let mut system = booted_system(&fast_config(16), &rom);
    system.tick().unwrap();

    // 0x7C blue -> 0x0F << 10
    assert_vram_pixel(system.gpu(), 0, 16, 0x0F << 10);
    assert_vram_pixel(system.gpu(), 15, 16, 0x0F << 10);
    assert_vram_pixel(system.gpu(), 16, 16, 0);
}

// Scenario C

/// Stage 16 GP0 words: five 16×1 white fills and a NOP
fn stage_packets(bus: &mut Bus, src: u32) {
    let mut words = Vec::new();
    for i in 0..5u32 {
        words.extend_from_slice(&[0x02FF_FFFF, (i * 4) << 16, 0x0001_0010]);
    }
    words.push(0);
    load_words(bus, src, &words);
}

fn start_gpu_dma(bus: &mut Bus, src: u32, irq_enable: bool) {
    bus.write32(DPCR, 0x0000_0800).unwrap();
    bus.write32(DICR, if irq_enable { 0x0084_0000 } else { 0 })
        .unwrap();
    bus.write32(D2_MADR, src).unwrap();
    bus.write32(D2_BCR, 16).unwrap();
    bus.write32(D2_CHCR, 0x1100_0001).unwrap();
}

fn drain(bus: &mut Bus) {
    for _ in 0..64 {
        bus.tick_dma();
    }
}

#[test]
fn scenario_c_dma_irq_when_enabled() {
    let mut bus = Bus::new();
    stage_packets(&mut bus, 0x8001_0000);
    start_gpu_dma(&mut bus, 0x0001_0000, true);
    drain(&mut bus);

    assert_eq!(bus.dma().channel(2).state(), ChannelState::Idle);
    assert_irq(&bus, interrupts::DMA, true);
    assert_ne!(bus.read32(DICR).unwrap() & (1 << 26), 0);
    for i in 0..5u16 {
        assert_vram_pixel(bus.gpu(), 15, i * 4, 0x7FFF);
    }
}

#[test]
fn scenario_c_no_irq_when_disabled() {
    let mut bus = Bus::new();
    stage_packets(&mut bus, 0x8001_0000);
    start_gpu_dma(&mut bus, 0x0001_0000, false);
    drain(&mut bus);

    assert_eq!(bus.dma().channel(2).state(), ChannelState::Idle);
    assert_irq(&bus, interrupts::DMA, false);
    assert_vram_pixel(bus.gpu(), 0, 16, 0x7FFF);
}

#[test]
fn scenario_c_through_ticks() {
    let mut system = booted_system(&fast_config(64), &idle_rom());
    stage_packets(system.bus_mut(), 0x8001_0000);
    start_gpu_dma(system.bus_mut(), 0x0001_0000, true);

    system.tick().unwrap();

    assert_irq(system.bus(), interrupts::DMA, true);
    assert_vram_pixel(system.gpu(), 0, 0, 0x7FFF);
}

#[test]
fn gp0_reads_back_status_not_command() {
    let mut bus = Bus::new();
    bus.write32(GP0, 0xE100_0123).unwrap();
    let value = bus.read32(GP0).unwrap();
    assert_ne!(value, 0xE100_0123);
    assert_eq!(value, bus.gpu().status());
    assert_eq!(value & 0x7FF, 0x123);
}

#[test]
fn gp1_reads_back_status_not_command() {
    let mut bus = Bus::new();
    bus.write32(GP1, 0x0800_0001).unwrap();
    let value = bus.read32(GP1).unwrap();
    assert_ne!(value, 0x0800_0001);
    assert_eq!(value, bus.gpu().status());
}
