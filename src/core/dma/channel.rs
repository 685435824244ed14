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

//! DMA channel register file and state machine
//!
//! A channel moves through **Idle → Transferring → Complete → Idle**.
//! The controller ([`DMA`](super::DMA)) decides when a channel may leave
//! Idle; this module only knows how a channel's registers decode and how
//! its cursor advances.

use bitflags::bitflags;

bitflags! {
    /// Single-bit fields of the channel control register (CHCR)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelControl: u32 {
        /// Transfer direction: set = RAM to device, clear = device to RAM
        const FROM_RAM = 1 << 0;
        /// Address step: set = decrement by 4, clear = increment by 4
        const BACKWARD = 1 << 1;
        /// Chopping enable (burst mode only)
        const CHOPPING = 1 << 8;
        /// Start/busy flag
        const START = 1 << 24;
        /// Manual trigger (burst mode)
        const TRIGGER = 1 << 28;
    }
}

/// CHCR bits that survive a register write
pub(super) const CHCR_WRITABLE: u32 = 0x7177_0703;

/// Synchronization mode (CHCR bits 9-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Whole block at once (optionally chopped)
    Burst,
    /// BS-word blocks, BA times
    Block,
    /// Linked list of GPU command packets
    LinkedList,
    /// Reserved encoding (3); treated as burst
    Reserved,
}

impl SyncMode {
    fn from_chcr(chcr: u32) -> Self {
        match (chcr >> 9) & 3 {
            0 => SyncMode::Burst,
            1 => SyncMode::Block,
            2 => SyncMode::LinkedList,
            _ => SyncMode::Reserved,
        }
    }
}

/// Life-cycle state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Transferring,
    /// Finished during the last step; returns to Idle on the next one
    Complete,
}

/// Single DMA channel
#[derive(Debug, Clone)]
pub struct DMAChannel {
    /// Memory Address Register (MADR)
    base_address: u32,

    /// Block Control Register (BCR)
    ///
    /// - Bits 0-15: Block size (words)
    /// - Bits 16-31: Block count
    block_control: u32,

    /// Channel Control Register (CHCR)
    channel_control: u32,

    /// Words left in the current transfer
    remaining: u32,

    /// Cursor address of the next word (or next list node)
    cursor: u32,

    state: ChannelState,

    channel_id: u8,
}

impl DMAChannel {
    /// Create a new DMA channel
    pub(super) fn new(channel_id: u8) -> Self {
        Self {
            base_address: 0,
            block_control: 0,
            channel_control: 0,
            remaining: 0,
            cursor: 0,
            state: ChannelState::Idle,
            channel_id,
        }
    }

    /// MADR value
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    /// BCR value
    pub fn block_control(&self) -> u32 {
        self.block_control
    }

    /// CHCR value
    pub fn channel_control(&self) -> u32 {
        self.channel_control
    }

    /// Remaining word count of the running transfer
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Internal cursor address
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Current life-cycle state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    #[inline(always)]
    fn control(&self) -> ChannelControl {
        ChannelControl::from_bits_retain(self.channel_control)
    }

    /// Start/busy flag (CHCR bit 24)
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.control().contains(ChannelControl::START)
    }

    /// RAM to device transfer
    #[inline(always)]
    pub fn from_ram(&self) -> bool {
        self.control().contains(ChannelControl::FROM_RAM)
    }

    /// Synchronization mode
    #[inline(always)]
    pub fn sync_mode(&self) -> SyncMode {
        SyncMode::from_chcr(self.channel_control)
    }

    /// Block size field (BCR bits 0-15)
    #[inline(always)]
    pub fn block_size(&self) -> u32 {
        self.block_control & 0xFFFF
    }

    /// Block count field (BCR bits 16-31)
    #[inline(always)]
    pub fn block_count(&self) -> u32 {
        self.block_control >> 16
    }

    /// Words moved per step while chopping is enabled
    #[inline(always)]
    fn chop_window(&self) -> u32 {
        1 << ((self.channel_control >> 16) & 7)
    }

    /// Address increment applied after each word
    #[inline(always)]
    fn step_delta(&self) -> u32 {
        if self.control().contains(ChannelControl::BACKWARD) {
            (-4i32) as u32
        } else {
            4
        }
    }

    pub(super) fn write_madr(&mut self, value: u32) {
        self.base_address = value & 0x00FF_FFFF;
    }

    pub(super) fn write_bcr(&mut self, value: u32) {
        self.block_control = value;
    }

    /// Store a CHCR write
    ///
    /// Clearing the start bit of a running transfer drops it back to Idle.
    pub(super) fn write_chcr(&mut self, value: u32) {
        self.channel_control = value & CHCR_WRITABLE;
        if !self.is_active() && self.state == ChannelState::Transferring {
            log::debug!(
                "DMA{} stopped with {} words left",
                self.channel_id,
                self.remaining
            );
            self.state = ChannelState::Idle;
            self.remaining = 0;
        }
    }

    /// Leave Idle and latch the transfer length and cursor
    ///
    /// # Returns
    ///
    /// `false` when the programmed size is zero; the caller then completes
    /// the channel immediately without moving data.
    pub(super) fn begin(&mut self) -> bool {
        self.cursor = self.base_address & 0x001F_FFFC;
        self.channel_control &= !ChannelControl::TRIGGER.bits();
        self.remaining = match self.sync_mode() {
            SyncMode::Burst | SyncMode::Reserved => self.block_size(),
            SyncMode::Block => self.block_size() * self.block_count(),
            SyncMode::LinkedList => 0,
        };
        self.state = ChannelState::Transferring;

        log::debug!(
            "DMA{} started: addr=0x{:08X} bcr=0x{:08X} mode={:?} words={}",
            self.channel_id,
            self.base_address,
            self.block_control,
            self.sync_mode(),
            self.remaining
        );

        self.sync_mode() == SyncMode::LinkedList || self.remaining != 0
    }

    /// Number of words the next step moves (burst and block modes)
    pub(super) fn unit_len(&self) -> u32 {
        let unit = match self.sync_mode() {
            SyncMode::Block => self.block_size(),
            _ if self.control().contains(ChannelControl::CHOPPING) => self.chop_window(),
            _ => self.remaining,
        };
        unit.min(self.remaining)
    }

    /// Advance the cursor by one word
    pub(super) fn advance(&mut self) {
        self.cursor = self.cursor.wrapping_add(self.step_delta()) & 0x001F_FFFC;
        self.remaining -= 1;
    }

    /// Write the cursor back to MADR after a completed block
    pub(super) fn sync_block_registers(&mut self) {
        self.base_address = self.cursor;
        if self.sync_mode() == SyncMode::Block && self.block_count() > 0 {
            let count = self.block_count() - 1;
            self.block_control = (count << 16) | self.block_size();
        }
    }

    /// Jump the linked-list cursor to the next node
    pub(super) fn follow_link(&mut self, next: u32) {
        self.cursor = next & 0x001F_FFFC;
        self.base_address = next & 0x00FF_FFFF;
    }

    /// Finish the transfer: clear busy/trigger and enter Complete
    pub(super) fn finish(&mut self) {
        self.channel_control &= !(ChannelControl::START | ChannelControl::TRIGGER).bits();
        self.remaining = 0;
        self.state = ChannelState::Complete;
        log::debug!("DMA{} complete", self.channel_id);
    }

    /// Complete → Idle
    pub(super) fn settle(&mut self) {
        if self.state == ChannelState::Complete {
            self.state = ChannelState::Idle;
        }
    }

    /// Overwrite every field from raw values (shared-state import)
    pub(super) fn restore(&mut self, madr: u32, bcr: u32, chcr: u32, len: u32, xadr: u32) {
        self.base_address = madr & 0x00FF_FFFF;
        self.block_control = bcr;
        self.channel_control = chcr & CHCR_WRITABLE;
        self.remaining = len;
        self.cursor = xadr & 0x001F_FFFC;
        self.state = if self.is_active()
            && (len != 0 || self.sync_mode() == SyncMode::LinkedList)
        {
            ChannelState::Transferring
        } else {
            ChannelState::Idle
        };
    }
}
