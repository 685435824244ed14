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

//! DMA (Direct Memory Access) Controller
//!
//! Eight channel slots move words between RAM and peripherals without CPU
//! load/store instructions. Each slot is an independent state machine
//! ([`ChannelState`]) advanced by one unit per [`DMA::step`].
//!
//! # DMA Channels
//!
//! | Channel | Device      | Base Address |
//! |---------|-------------|--------------|
//! | 0       | MDEC In     | 0x1F801080   |
//! | 1       | MDEC Out    | 0x1F801090   |
//! | 2       | GPU         | 0x1F8010A0   |
//! | 3       | CD-ROM      | 0x1F8010B0   |
//! | 4       | SPU         | 0x1F8010C0   |
//! | 5       | PIO         | 0x1F8010D0   |
//! | 6       | OTC         | 0x1F8010E0   |
//! | 7       | (reserved)  | shadowed by DPCR/DICR |
//!
//! Only the GPU channel and OTC have a functional peripheral. The others
//! are pass-through: words sent to the device are discarded and words read
//! from it are zero.
//!
//! # Channel Registers
//!
//! - **MADR** (+0x00): Memory address register
//! - **BCR** (+0x04): Block control register
//! - **CHCR** (+0x08): Channel control register
//!
//! # Global Registers
//!
//! - **DPCR** (0x1F8010F0): per-channel priority (3 bits) and enable (1 bit)
//! - **DICR** (0x1F8010F4): completion flags and interrupt enables
//!
//! # Units per step
//!
//! - Burst (sync 0): the whole block, or one chop window when chopping
//! - Block (sync 1): one block of BS words
//! - Linked list (sync 2): one node (header plus payload)

mod channel;

pub use channel::{ChannelControl, ChannelState, DMAChannel, SyncMode};

use crate::core::error::Result;
use crate::core::memory::IODevice;

#[cfg(test)]
mod tests;

/// Peripheral side of a DMA channel
///
/// Implemented by devices that can sit at the far end of a channel.
pub trait DmaTarget {
    /// Accept one word travelling RAM → device
    fn dma_write(&mut self, word: u32);

    /// Produce one word travelling device → RAM
    fn dma_read(&mut self) -> u32;
}

/// Stand-in for channels without a modeled peripheral
struct NullTarget;

impl DmaTarget for NullTarget {
    fn dma_write(&mut self, word: u32) {
        log::trace!("DMA write to unmodeled device discarded: 0x{:08X}", word);
    }

    fn dma_read(&mut self) -> u32 {
        0
    }
}

/// DMA Controller with 8 channel slots
///
/// # Examples
///
/// ```
/// use xsp::core::dma::DMA;
///
/// let dma = DMA::new();
/// assert_eq!(dma.read_control(), 0x07654321);
///
/// // Reset priorities carry no enable bits
/// assert!(!dma.is_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct DMA {
    channels: [DMAChannel; 8],

    /// DMA Control Register (DPCR) at 0x1F8010F0
    control: u32,

    /// DMA Interrupt Register (DICR) at 0x1F8010F4, without bit 31
    interrupt: u32,

    /// Any channel enabled in DPCR
    dma_enabled: bool,

    /// Last computed DICR master flag, for edge detection
    master_flag: bool,

    /// DMA interrupt edge not yet forwarded to the interrupt controller
    irq_pending: bool,
}

impl DMA {
    /// Channel 0: MDEC In
    pub const CH_MDEC_IN: usize = 0;

    /// Channel 1: MDEC Out
    pub const CH_MDEC_OUT: usize = 1;

    /// Channel 2: GPU (graphics)
    pub const CH_GPU: usize = 2;

    /// Channel 3: CD-ROM
    pub const CH_CDROM: usize = 3;

    /// Channel 4: SPU
    pub const CH_SPU: usize = 4;

    /// Channel 5: PIO
    pub const CH_PIO: usize = 5;

    /// Channel 6: OTC (ordering table clear)
    pub const CH_OTC: usize = 6;

    /// Number of channel slots in the state block
    pub const CHANNEL_COUNT: usize = 8;

    /// First register address of the controller
    pub const BASE: u32 = 0x1F80_1080;

    /// DPCR reset value
    const DPCR_RESET: u32 = 0x0765_4321;

    /// DICR bits written directly (0-5, force, enables, master enable)
    const DICR_WRITABLE: u32 = 0x00FF_803F;

    /// Linked-list end-of-list marker
    const LIST_END: u32 = 0x0080_0000;

    /// Create a new DMA controller
    ///
    /// All channels start Idle with the default priority ordering.
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|i| DMAChannel::new(i as u8)),
            control: Self::DPCR_RESET,
            interrupt: 0,
            dma_enabled: Self::enabled_from(Self::DPCR_RESET),
            master_flag: false,
            irq_pending: false,
        }
    }

    #[inline(always)]
    fn enabled_from(dpcr: u32) -> bool {
        dpcr & 0x0888_8888 != 0
    }

    /// Access a channel slot
    ///
    /// # Panics
    ///
    /// Panics if `ch >= 8`.
    pub fn channel(&self, ch: usize) -> &DMAChannel {
        &self.channels[ch]
    }

    /// Global DMA-enable latch
    pub fn is_enabled(&self) -> bool {
        self.dma_enabled
    }

    /// DPCR enable bit of one channel
    #[inline(always)]
    fn channel_enabled(&self, ch: usize) -> bool {
        self.control & (0x8 << (ch * 4)) != 0
    }

    /// DPCR priority of one channel (0 = highest)
    #[inline(always)]
    fn priority(&self, ch: usize) -> u32 {
        (self.control >> (ch * 4)) & 0x7
    }

    /// Channel indices in service order: priority ascending, then index
    fn service_order(&self) -> [usize; 7] {
        let mut order = [0, 1, 2, 3, 4, 5, 6];
        order.sort_by_key(|&ch| (self.priority(ch), ch));
        order
    }

    /// Whether a channel may leave Idle right now
    fn may_start(&self, ch: usize) -> bool {
        ch < 7 && self.dma_enabled && self.channel_enabled(ch)
    }

    /// Advance every channel by one unit
    ///
    /// Transferring channels are visited in DPCR priority order (ties by
    /// lower index). Channels that finished during the previous step return
    /// to Idle first, and armed channels whose enable has since been granted
    /// start.
    ///
    /// # Arguments
    ///
    /// * `ram` - Main system RAM
    /// * `gpu` - Peripheral bound to channel 2
    ///
    /// # Returns
    ///
    /// `true` if a DMA interrupt edge is waiting for the interrupt controller
    pub fn step(&mut self, ram: &mut [u8], gpu: &mut impl DmaTarget) -> bool {
        for ch in self.service_order() {
            self.channels[ch].settle();

            if self.channels[ch].state() == ChannelState::Idle
                && self.channels[ch].is_active()
                && self.may_start(ch)
            {
                self.start(ch);
            }

            if self.channels[ch].state() != ChannelState::Transferring {
                continue;
            }

            match ch {
                Self::CH_GPU => self.run_unit(ch, ram, gpu),
                _ => self.run_unit(ch, ram, &mut NullTarget),
            }
        }

        self.take_irq()
    }

    /// True while any channel is Transferring
    pub fn is_busy(&self) -> bool {
        self.channels
            .iter()
            .any(|c| c.state() == ChannelState::Transferring)
    }

    fn start(&mut self, ch: usize) {
        if !self.channels[ch].begin() {
            log::debug!("DMA{} started with zero length, completing", ch);
            self.complete(ch);
        }
    }

    /// Move one unit for a Transferring channel
    fn run_unit(&mut self, ch: usize, ram: &mut [u8], target: &mut impl DmaTarget) {
        match self.channels[ch].sync_mode() {
            SyncMode::LinkedList => self.run_list_node(ch, ram, target),
            _ => {
                let words = self.channels[ch].unit_len();
                for _ in 0..words {
                    self.transfer_word(ch, ram, target);
                }

                if self.channels[ch].sync_mode() == SyncMode::Block {
                    self.channels[ch].sync_block_registers();
                }

                if self.channels[ch].remaining() == 0 {
                    self.complete(ch);
                }
            }
        }
    }

    /// Move the word under the channel cursor
    fn transfer_word(&mut self, ch: usize, ram: &mut [u8], target: &mut impl DmaTarget) {
        let chan = &self.channels[ch];
        let addr = chan.cursor();

        if ch == Self::CH_OTC {
            // Ordering table: each entry links to the previous word, the
            // final one carries the end marker.
            let entry = if chan.remaining() == 1 {
                0x00FF_FFFF
            } else {
                addr.wrapping_sub(4) & 0x001F_FFFF
            };
            write_ram_u32(ram, addr, entry);
        } else if chan.from_ram() {
            target.dma_write(read_ram_u32(ram, addr));
        } else {
            write_ram_u32(ram, addr, target.dma_read());
        }

        self.channels[ch].advance();
    }

    /// Send one linked-list node to the device
    fn run_list_node(&mut self, ch: usize, ram: &mut [u8], target: &mut impl DmaTarget) {
        let addr = self.channels[ch].cursor();
        let header = read_ram_u32(ram, addr);
        let count = header >> 24;

        for i in 0..count {
            let word = read_ram_u32(ram, addr.wrapping_add(4 * (i + 1)));
            target.dma_write(word);
        }

        self.channels[ch].follow_link(header);
        if header & Self::LIST_END != 0 {
            self.complete(ch);
        }
    }

    /// Transferring → Complete, flag and maybe raise the DMA interrupt
    fn complete(&mut self, ch: usize) {
        self.channels[ch].finish();
        self.interrupt |= 1 << (24 + ch);
        self.update_master_flag();
    }

    /// Recompute DICR bit 31 and latch a rising edge
    fn update_master_flag(&mut self) {
        let force = self.interrupt & (1 << 15) != 0;
        let master_enable = self.interrupt & (1 << 23) != 0;
        let enables = (self.interrupt >> 16) & 0x7F;
        let flags = (self.interrupt >> 24) & 0x7F;

        let flag = force || (master_enable && (enables & flags) != 0);
        if flag && !self.master_flag {
            log::debug!("DMA interrupt raised (DICR=0x{:08X})", self.interrupt);
            self.irq_pending = true;
        }
        self.master_flag = flag;
    }

    /// Take the pending DMA interrupt edge, if any
    pub fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }

    // Register access methods

    /// Read channel MADR register
    pub fn read_madr(&self, channel: usize) -> u32 {
        self.channels[channel].base_address()
    }

    /// Write channel MADR register
    pub fn write_madr(&mut self, channel: usize, value: u32) {
        self.channels[channel].write_madr(value);
        log::trace!("DMA{} MADR = 0x{:08X}", channel, value);
    }

    /// Read channel BCR register
    pub fn read_bcr(&self, channel: usize) -> u32 {
        self.channels[channel].block_control()
    }

    /// Write channel BCR register
    pub fn write_bcr(&mut self, channel: usize, value: u32) {
        self.channels[channel].write_bcr(value);
        log::trace!("DMA{} BCR = 0x{:08X}", channel, value);
    }

    /// Read channel CHCR register
    pub fn read_chcr(&self, channel: usize) -> u32 {
        self.channels[channel].channel_control()
    }

    /// Write channel CHCR register
    ///
    /// Setting the start bit on an Idle channel starts it immediately when
    /// the controller allows; otherwise the channel stays armed until it
    /// does. Clearing the start bit mid-transfer stops the channel without
    /// setting its completion flag.
    pub fn write_chcr(&mut self, channel: usize, value: u32) {
        log::trace!("DMA{} CHCR = 0x{:08X}", channel, value);
        let value = if channel == Self::CH_OTC {
            // OTC always walks backwards; only start/trigger are writable
            (value & 0x5100_0000) | ChannelControl::BACKWARD.bits()
        } else {
            value
        };
        self.channels[channel].write_chcr(value);

        if self.channels[channel].state() != ChannelState::Transferring
            && self.channels[channel].is_active()
            && self.may_start(channel)
        {
            self.channels[channel].settle();
            self.start(channel);
        }
    }

    /// Read DMA Control Register (DPCR)
    pub fn read_control(&self) -> u32 {
        self.control
    }

    /// Write DMA Control Register (DPCR)
    pub fn write_control(&mut self, value: u32) {
        self.control = value;
        self.dma_enabled = Self::enabled_from(value);
        log::trace!("DPCR = 0x{:08X} (enabled={})", value, self.dma_enabled);
    }

    /// Read DMA Interrupt Register (DICR), bit 31 included
    pub fn read_interrupt(&self) -> u32 {
        self.interrupt | ((self.master_flag as u32) << 31)
    }

    /// Write DMA Interrupt Register (DICR)
    ///
    /// Bits 0-5, 15 and 16-23 are stored, bits 24-30 are write-1-to-clear
    /// and bit 31 is read-only.
    pub fn write_interrupt(&mut self, value: u32) {
        let flags = self.interrupt & 0x7F00_0000 & !(value & 0x7F00_0000);
        self.interrupt = (value & Self::DICR_WRITABLE) | flags;
        self.update_master_flag();
        log::trace!("DICR = 0x{:08X}", self.read_interrupt());
    }

    /// Overwrite controller state from raw values (shared-state import)
    pub(crate) fn restore(&mut self, dpcr: u32, dicr: u32, channels: &[[u32; 5]; 8]) {
        self.control = dpcr;
        self.dma_enabled = Self::enabled_from(dpcr);
        self.interrupt = dicr & 0x7FFF_FFFF;
        self.master_flag = dicr & 0x8000_0000 != 0;
        self.irq_pending = false;
        for (chan, &[madr, bcr, chcr, len, xadr]) in self.channels.iter_mut().zip(channels) {
            chan.restore(madr, bcr, chcr, len, xadr);
        }
    }
}

impl DMA {
    /// Current register value used as the base of a narrow store
    ///
    /// DICR flags are write-1-to-clear, so they are stripped to keep a
    /// narrow store from echoing them back and wiping them.
    fn merge_base(&mut self, aligned: u32) -> Result<u32> {
        let current = self.read_register(aligned)?;
        Ok(if aligned == 0x74 {
            current & 0x00FF_FFFF
        } else {
            current
        })
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}

impl IODevice for DMA {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::BASE + 0x7F)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        let channel = (offset >> 4) as usize;
        let value = match (channel, offset & 0xC) {
            (7, 0x0) => self.read_control(),
            (7, 0x4) => self.read_interrupt(),
            (7, _) => 0,
            (ch, 0x0) => self.read_madr(ch),
            (ch, 0x4) => self.read_bcr(ch),
            (ch, 0x8) => self.read_chcr(ch),
            _ => 0,
        };
        Ok(value)
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let channel = (offset >> 4) as usize;
        match (channel, offset & 0xC) {
            (7, 0x0) => self.write_control(value),
            (7, 0x4) => self.write_interrupt(value),
            (ch, 0x0) if ch < 7 => self.write_madr(ch, value),
            (ch, 0x4) if ch < 7 => self.write_bcr(ch, value),
            (ch, 0x8) if ch < 7 => self.write_chcr(ch, value),
            _ => log::trace!("DMA write to unused offset 0x{:02X} ignored", offset),
        }
        Ok(())
    }

    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let aligned = offset & !0x3;
        let shift = (offset & 0x2) * 8;
        let current = self.merge_base(aligned)?;
        let merged = (current & !(0xFFFF << shift)) | ((value as u32) << shift);
        self.write_register(aligned, merged)
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let aligned = offset & !0x3;
        let shift = (offset & 0x3) * 8;
        let current = self.merge_base(aligned)?;
        let merged = (current & !(0xFF << shift)) | ((value as u32) << shift);
        self.write_register(aligned, merged)
    }

    fn name(&self) -> &str {
        "DMA Controller"
    }
}

/// Read 32-bit word from RAM
#[inline(always)]
pub(crate) fn read_ram_u32(ram: &[u8], addr: u32) -> u32 {
    let addr = (addr & 0x001F_FFFC) as usize;
    match ram.get(addr..addr + 4) {
        Some(bytes) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        None => {
            log::error!("DMA read out of bounds: 0x{:08X}", addr);
            0
        }
    }
}

/// Write 32-bit word to RAM
#[inline(always)]
pub(crate) fn write_ram_u32(ram: &mut [u8], addr: u32, value: u32) {
    let addr = (addr & 0x001F_FFFC) as usize;
    match ram.get_mut(addr..addr + 4) {
        Some(bytes) => bytes.copy_from_slice(&value.to_le_bytes()),
        None => log::error!("DMA write out of bounds: 0x{:08X}", addr),
    }
}
