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

//! GPU DMA driven through the bus the way guest code would

use super::*;
use crate::core::dma::ChannelState;
use crate::core::interrupt::interrupts;

const DPCR: u32 = 0x1F80_10F0;
const DICR: u32 = 0x1F80_10F4;
const D2_MADR: u32 = 0x1F80_10A0;
const D2_BCR: u32 = 0x1F80_10A4;
const D2_CHCR: u32 = 0x1F80_10A8;

/// Put 16 GP0 words at `src`: five 16x1 fills plus a NOP
fn stage_fills(system: &mut System, src: u32) {
    let mut words = Vec::new();
    for i in 0..5u32 {
        words.push(0x0200_00FF);
        words.push((i * 16) << 16);
        words.push(0x0001_0010);
    }
    words.push(0);
    for (i, word) in words.iter().enumerate() {
        system
            .bus_mut()
            .write32(src + 4 * i as u32, *word)
            .unwrap();
    }
}

fn start_burst(system: &mut System, src: u32, irq_enable: bool) {
    let bus = system.bus_mut();
    bus.write32(DPCR, 0x0000_0800).unwrap();
    let dicr = if irq_enable { (1 << 23) | (1 << 18) } else { 0 };
    bus.write32(DICR, dicr).unwrap();
    bus.write32(D2_MADR, src).unwrap();
    bus.write32(D2_BCR, 16).unwrap();
    bus.write32(D2_CHCR, 0x1100_0001).unwrap();
}

fn dma_irq(system: &System) -> bool {
    system.bus().interrupt_controller().read_status() & interrupts::DMA as u32 != 0
}

#[test]
fn test_gpu_dma_with_irq_enabled() {
    let mut system = booted(&Config::default());
    stage_fills(&mut system, 0x8000_2000);
    start_burst(&mut system, 0x0000_2000, true);

    system.step_n(32).unwrap();

    assert_eq!(system.bus().dma().channel(2).state(), ChannelState::Idle);
    assert!(dma_irq(&system));
    for i in 0..5u16 {
        assert_eq!(system.gpu().read_vram(0, i * 16), 0x001F);
    }
}

#[test]
fn test_gpu_dma_with_irq_disabled() {
    let mut system = booted(&Config::default());
    stage_fills(&mut system, 0x8000_2000);
    start_burst(&mut system, 0x0000_2000, false);

    system.step_n(32).unwrap();

    assert_eq!(system.bus().dma().channel(2).state(), ChannelState::Idle);
    assert!(!dma_irq(&system));
    assert_eq!(system.gpu().read_vram(15, 64), 0x001F);
}
