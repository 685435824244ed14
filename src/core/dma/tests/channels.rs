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

//! Channel state machine tests: gating, priority, stop and completion

use super::*;

#[test]
fn test_channel_stays_idle_while_dma_disabled() {
    let mut dma = DMA::new();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();
    fill_words(&mut ram, 0x1000, 4, 0xA0);

    dma.write_madr(DMA::CH_GPU, 0x1000);
    dma.write_bcr(DMA::CH_GPU, 4);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);

    for _ in 0..4 {
        dma.step(&mut ram, &mut gpu);
    }
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Idle);
    assert!(gpu.received.is_empty());

    // Armed channel starts once its DPCR enable appears
    dma.write_control(0x0000_0800);
    dma.step(&mut ram, &mut gpu);
    assert_eq!(gpu.received, vec![0xA0, 0xA1, 0xA2, 0xA3]);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Complete);
}

#[test]
fn test_channel_needs_its_own_enable_bit() {
    let mut dma = DMA::new();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();

    // Only OTC enabled: the GPU channel must not start
    dma.write_control(0x0800_0000);
    dma.write_bcr(DMA::CH_GPU, 1);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);
    dma.step(&mut ram, &mut gpu);

    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Idle);
    assert!(dma.channel(DMA::CH_GPU).is_active());
}

#[test]
fn test_complete_returns_to_idle() {
    let mut dma = enabled_dma();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();

    dma.write_bcr(DMA::CH_GPU, 2);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Transferring);

    dma.step(&mut ram, &mut gpu);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Complete);
    assert!(!dma.channel(DMA::CH_GPU).is_active());

    dma.step(&mut ram, &mut gpu);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Idle);
}

#[test]
fn test_zero_block_count_completes_without_data() {
    let mut dma = enabled_dma();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();
    enable_irq(&mut dma, DMA::CH_GPU);

    dma.write_madr(DMA::CH_GPU, 0x1000);
    dma.write_bcr(DMA::CH_GPU, 0);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);

    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Complete);
    assert!(dma.step(&mut ram, &mut gpu));
    assert!(gpu.received.is_empty());
    assert_eq!(dma.read_madr(DMA::CH_GPU), 0x1000);
}

#[test]
fn test_stop_mid_transfer_raises_nothing() {
    let mut dma = enabled_dma();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();
    enable_irq(&mut dma, DMA::CH_GPU);
    fill_words(&mut ram, 0x2000, 16, 0);

    // Chopping with a one-word window: one word per step
    dma.write_madr(DMA::CH_GPU, 0x2000);
    dma.write_bcr(DMA::CH_GPU, 16);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM | 0x100);

    let mut irq = false;
    for _ in 0..5 {
        irq |= dma.step(&mut ram, &mut gpu);
    }
    assert_eq!(gpu.received.len(), 5);
    assert_eq!(dma.channel(DMA::CH_GPU).remaining(), 11);

    // Clear the start bit
    dma.write_chcr(DMA::CH_GPU, 0x0000_0101);
    for _ in 0..20 {
        irq |= dma.step(&mut ram, &mut gpu);
    }

    assert!(!irq);
    assert_eq!(gpu.received.len(), 5);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Idle);
    assert_eq!(dma.read_interrupt() & 0xFF00_0000, 0);
}

#[test]
fn test_chop_window_size() {
    let mut dma = enabled_dma();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();

    // Window 2^2 = 4 words
    dma.write_bcr(DMA::CH_GPU, 10);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM | 0x100 | (2 << 16));

    dma.step(&mut ram, &mut gpu);
    assert_eq!(gpu.received.len(), 4);
    dma.step(&mut ram, &mut gpu);
    assert_eq!(gpu.received.len(), 8);
    dma.step(&mut ram, &mut gpu);
    assert_eq!(gpu.received.len(), 10);
    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Complete);
}

#[test]
fn test_service_order_follows_priority() {
    let mut dma = DMA::new();

    // OTC priority 0, GPU priority 1, everyone else 7
    dma.write_control(0x0877_7977);
    let order = dma.service_order();
    assert_eq!(order[0], DMA::CH_OTC);
    assert_eq!(order[1], DMA::CH_GPU);

    // Equal priorities resolve by channel index
    dma.write_control(0x0333_3333);
    assert_eq!(dma.service_order(), [0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_channel_seven_never_starts() {
    let mut dma = enabled_dma();
    assert!(!dma.may_start(7));

    // Its window is DPCR/DICR, so CHCR-like offsets land on those registers
    dma.write_register(0x78, 0x0100_0000).unwrap();
    assert_eq!(dma.channel(7).state(), ChannelState::Idle);
}

#[test]
fn test_irq_only_with_channel_enable() {
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();

    // Master enable without the channel enable: flag yes, interrupt no
    let mut dma = enabled_dma();
    dma.write_interrupt(1 << 23);
    dma.write_bcr(DMA::CH_GPU, 1);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);
    assert!(!dma.step(&mut ram, &mut gpu));
    assert_ne!(dma.read_interrupt() & (1 << 26), 0);
    assert_eq!(dma.read_interrupt() >> 31, 0);

    // Channel enable without master enable: no interrupt
    let mut dma = enabled_dma();
    dma.write_interrupt(1 << 18);
    dma.write_bcr(DMA::CH_GPU, 1);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);
    assert!(!dma.step(&mut ram, &mut gpu));

    // Both: interrupt and master flag
    let mut dma = enabled_dma();
    enable_irq(&mut dma, DMA::CH_GPU);
    dma.write_bcr(DMA::CH_GPU, 1);
    dma.write_chcr(DMA::CH_GPU, CHCR_BURST_FROM_RAM);
    assert!(dma.step(&mut ram, &mut gpu));
    assert_eq!(dma.read_interrupt() >> 31, 1);
}

#[test]
fn test_restore_resumes_transfer() {
    let mut dma = DMA::new();
    let mut ram = test_ram();
    let mut gpu = RecordingTarget::default();
    fill_words(&mut ram, 0x3000, 8, 0x50);

    let mut regs = [[0u32; 5]; 8];
    regs[DMA::CH_GPU] = [0x3000, 8, 0x0100_0101, 3, 0x3014];
    dma.restore(0x0000_0800, 0, &regs);

    assert_eq!(dma.channel(DMA::CH_GPU).state(), ChannelState::Transferring);
    dma.step(&mut ram, &mut gpu);
    assert_eq!(gpu.received, vec![0x55]);
}
