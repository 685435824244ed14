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

//! Shared helpers for DMA tests

use super::*;

/// Peripheral double that records words it receives
#[derive(Default)]
pub struct RecordingTarget {
    pub received: Vec<u32>,
    pub next_read: u32,
}

impl DmaTarget for RecordingTarget {
    fn dma_write(&mut self, word: u32) {
        self.received.push(word);
    }

    fn dma_read(&mut self) -> u32 {
        let word = self.next_read;
        self.next_read = self.next_read.wrapping_add(1);
        word
    }
}

/// DMA controller with every channel enabled in DPCR (default priorities)
pub fn enabled_dma() -> DMA {
    let mut dma = DMA::new();
    dma.write_control(0x0765_4321 | 0x0888_8888);
    dma
}

/// 2MB of zeroed work RAM
pub fn test_ram() -> Vec<u8> {
    vec![0u8; 2 * 1024 * 1024]
}

/// Fill `count` words starting at `addr` with `base + i`
pub fn fill_words(ram: &mut [u8], addr: u32, count: u32, base: u32) {
    for i in 0..count {
        write_ram_u32(ram, addr + i * 4, base + i);
    }
}

/// Enable DICR master enable plus the completion enable for `channel`
pub fn enable_irq(dma: &mut DMA, channel: usize) {
    dma.write_interrupt((1 << 23) | (1 << (16 + channel)));
}

/// CHCR for a RAM → device burst with start set
pub const CHCR_BURST_FROM_RAM: u32 = 0x1100_0001;

/// Step until the channel leaves Transferring (bounded)
pub fn run_to_completion(
    dma: &mut DMA,
    ram: &mut [u8],
    target: &mut RecordingTarget,
    channel: usize,
) -> usize {
    let mut steps = 0;
    while dma.channel(channel).state() == ChannelState::Transferring {
        dma.step(ram, target);
        steps += 1;
        assert!(steps < 10_000, "DMA{} never completed", channel);
    }
    steps
}
