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

//! Register-level properties checked through the bus

mod common;

use common::fixtures::load_words;
use proptest::prelude::*;
use xsp::core::dma::ChannelState;
use xsp::core::interrupt::interrupts;
use xsp::core::memory::Bus;

const I_STAT: u32 = 0x1F80_1070;
const I_MASK: u32 = 0x1F80_1074;
const GP0: u32 = 0x1F80_1810;
const DPCR: u32 = 0x1F80_10F0;
const DICR: u32 = 0x1F80_10F4;
const D2_MADR: u32 = 0x1F80_10A0;
const D2_BCR: u32 = 0x1F80_10A4;
const D2_CHCR: u32 = 0x1F80_10A8;

const SRC: u32 = 0x0002_0000;

/// Open a CPU→VRAM transfer `width` pixels wide at (0, 0)
fn open_vram_upload(bus: &mut Bus, width: u32) {
    bus.write32(GP0, 0xA000_0000).unwrap();
    bus.write32(GP0, 0).unwrap();
    bus.write32(GP0, (1 << 16) | width).unwrap();
}

fn start_burst(bus: &mut Bus, words: u32, dicr: u32) {
    bus.write32(DPCR, 0x0000_0800).unwrap();
    bus.write32(DICR, dicr).unwrap();
    bus.write32(D2_MADR, SRC).unwrap();
    bus.write32(D2_BCR, words).unwrap();
    bus.write32(D2_CHCR, 0x1100_0001).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn burst_moves_exactly_n_words(n in 1u32..64) {
        let mut bus = Bus::new();
        let payload: Vec<u32> = (0..n).map(|i| 0x1000_0001u32.wrapping_mul(i + 1) & 0x7FFF_7FFF).collect();
        load_words(&mut bus, 0x8000_0000 | SRC, &payload);
        // Sentinel right after the block must never reach VRAM
        bus.write32(0x8000_0000 | (SRC + 4 * n), 0x7FFF_7FFF).unwrap();

        open_vram_upload(&mut bus, 2 * n + 2);
        start_burst(&mut bus, n, 0);
        for _ in 0..(n + 4) {
            bus.tick_dma();
        }

        prop_assert_eq!(bus.dma().channel(2).state(), ChannelState::Idle);
        for (i, word) in payload.iter().enumerate() {
            prop_assert_eq!(bus.gpu().read_vram(2 * i as u16, 0), *word as u16);
            prop_assert_eq!(bus.gpu().read_vram(2 * i as u16 + 1, 0), (*word >> 16) as u16);
        }
        prop_assert_eq!(bus.gpu().read_vram(2 * n as u16, 0), 0);
        prop_assert_eq!(bus.gpu().read_vram(2 * n as u16 + 1, 0), 0);
    }

    #[test]
    fn stopped_transfer_raises_no_interrupt(n in 8u32..64, stop_after in 1u32..7) {
        let mut bus = Bus::new();
        open_vram_upload(&mut bus, 2 * n);
        start_burst(&mut bus, n, 0x0084_0000);

        for _ in 0..stop_after {
            bus.tick_dma();
        }
        bus.write32(D2_CHCR, 0x0000_0001).unwrap();
        for _ in 0..n {
            bus.tick_dma();
        }

        prop_assert_eq!(bus.dma().channel(2).state(), ChannelState::Idle);
        prop_assert_eq!(bus.read32(I_STAT).unwrap() & interrupts::DMA as u32, 0);
        prop_assert_eq!(bus.read32(DICR).unwrap() & (1 << 26), 0);
    }

    #[test]
    fn mask_register_round_trips(mask in 0u32..0x800) {
        let mut bus = Bus::new();
        bus.write32(I_MASK, mask).unwrap();
        prop_assert_eq!(bus.read32(I_MASK).unwrap(), mask);
    }

    #[test]
    fn acknowledge_clears_only_written_bits(raised in 0u16..0x800, ack in 0u16..0x800) {
        let mut bus = Bus::new();
        bus.interrupt_controller_mut().request(raised);
        bus.interrupt_controller_mut().request(raised);
        prop_assert_eq!(bus.read32(I_STAT).unwrap(), raised as u32);

        bus.write32(I_STAT, ack as u32).unwrap();
        prop_assert_eq!(bus.read32(I_STAT).unwrap(), (raised & !ack) as u32);
    }

    #[test]
    fn masked_source_surfaces_when_unmasked(source in 0u32..11) {
        let mut bus = Bus::new();
        let bit = 1u16 << source;
        bus.write32(I_MASK, 0).unwrap();
        bus.interrupt_controller_mut().request(bit);
        prop_assert!(!bus.irq_pending());

        bus.write32(I_MASK, bit as u32).unwrap();
        prop_assert!(bus.irq_pending());
    }
}
