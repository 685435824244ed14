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

//! Shared-state boundary
//!
//! The host and the engine agree on one contiguous record of 32-bit
//! little-endian words. Every field sits at a fixed byte offset so a host
//! that only knows the layout (not the engine's types) can preload the ROM,
//! raise the communications flag and read registers back for diagnostics.
//!
//! Internally every component keeps its own typed state; this module is the
//! only place that knows about byte offsets. [`SharedState::export`]
//! serializes a [`System`] out at a tick boundary and
//! [`SharedState::import`] loads one back in.
//!
//! # Layout
//!
//! | Field          | Words          |
//! |----------------|----------------|
//! | `debug_vram`   | 64 × 32 × 2    |
//! | `xcomms`       | 1              |
//! | `ram`          | 2048 × 256     |
//! | `vram`         | 1024 × 256     |
//! | `rom`          | 512 × 256      |
//! | `sram`         | 512 × 512      |
//! | `scratch`      | 256            |
//! | `gpu_fifo`     | 16             |
//! | `regs`         | 32             |
//! | `c0_regs`      | 32             |
//! | `rlo` .. `gpu_y` | 1 each       |
//! | `dx_madr` .. `dx_xadr` | 8 each |
//! | `dpcr` .. `spu_wptr` | 1 each   |
//!
//! # Example
//!
//! ```
//! use xsp::core::shared_state::{Field, SharedState};
//!
//! let mut state = vec![0u8; SharedState::SIZE];
//! SharedState::set_comms(&mut state, 1).unwrap();
//! assert_eq!(SharedState::read_word(&state, Field::Xcomms, 0), Some(1));
//! assert_eq!(SharedState::offset_of(Field::Xcomms), 64 * 32 * 2 * 4);
//! ```

use log::{debug, warn};

use super::console::GRID_WORDS;
use super::cpu::CpuRegisters;
use super::error::{EmulatorError, Result};
use super::gpu::{FIFO_SLOTS, GPU};
use super::memory::Bus;
use super::system::System;

/// One field of the shared record, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DebugVram,
    Xcomms,
    Ram,
    Vram,
    Rom,
    Sram,
    Scratch,
    GpuFifo,
    Regs,
    C0Regs,
    Rlo,
    Rhi,
    /// Value of the pending load
    LsAddr,
    LsReg,
    LsOp,
    Pc,
    PcDiff,
    FaultCause,
    FaultPc,
    Seg7,
    IStat,
    IMask,
    GpuStat,
    GpuFifoBeg,
    GpuFifoEnd,
    GpuY,
    DxMadr,
    DxBcr,
    DxChcr,
    DxLen,
    DxXadr,
    Dpcr,
    Dicr,
    DmaEnabled,
    SpuWptr,
}

impl Field {
    /// Every field in layout order
    pub const ALL: [Field; 35] = [
        Field::DebugVram,
        Field::Xcomms,
        Field::Ram,
        Field::Vram,
        Field::Rom,
        Field::Sram,
        Field::Scratch,
        Field::GpuFifo,
        Field::Regs,
        Field::C0Regs,
        Field::Rlo,
        Field::Rhi,
        Field::LsAddr,
        Field::LsReg,
        Field::LsOp,
        Field::Pc,
        Field::PcDiff,
        Field::FaultCause,
        Field::FaultPc,
        Field::Seg7,
        Field::IStat,
        Field::IMask,
        Field::GpuStat,
        Field::GpuFifoBeg,
        Field::GpuFifoEnd,
        Field::GpuY,
        Field::DxMadr,
        Field::DxBcr,
        Field::DxChcr,
        Field::DxLen,
        Field::DxXadr,
        Field::Dpcr,
        Field::Dicr,
        Field::DmaEnabled,
        Field::SpuWptr,
    ];

    /// Size of the field in 32-bit words
    pub const fn words(self) -> usize {
        match self {
            Field::DebugVram => 64 * 32 * 2,
            Field::Ram => 2048 * 256,
            Field::Vram => 1024 * 256,
            Field::Rom => 512 * 256,
            Field::Sram => 512 * 512,
            Field::Scratch => 256,
            Field::GpuFifo => 16,
            Field::Regs | Field::C0Regs => 32,
            Field::DxMadr | Field::DxBcr | Field::DxChcr | Field::DxLen | Field::DxXadr => 8,
            _ => 1,
        }
    }

    /// Size of the field in bytes
    pub const fn bytes(self) -> usize {
        self.words() * 4
    }

    /// Name used by the host layout
    pub fn name(self) -> &'static str {
        match self {
            Field::DebugVram => "debug_vram",
            Field::Xcomms => "xcomms",
            Field::Ram => "ram",
            Field::Vram => "vram",
            Field::Rom => "rom",
            Field::Sram => "sram",
            Field::Scratch => "scratch",
            Field::GpuFifo => "gpu_fifo",
            Field::Regs => "regs",
            Field::C0Regs => "c0_regs",
            Field::Rlo => "rlo",
            Field::Rhi => "rhi",
            Field::LsAddr => "lsaddr",
            Field::LsReg => "lsreg",
            Field::LsOp => "lsop",
            Field::Pc => "pc",
            Field::PcDiff => "pcdiff",
            Field::FaultCause => "fault_cause",
            Field::FaultPc => "fault_pc",
            Field::Seg7 => "seg7",
            Field::IStat => "i_stat",
            Field::IMask => "i_mask",
            Field::GpuStat => "gpu_stat",
            Field::GpuFifoBeg => "gpu_fifo_beg",
            Field::GpuFifoEnd => "gpu_fifo_end",
            Field::GpuY => "gpu_y",
            Field::DxMadr => "dx_madr",
            Field::DxBcr => "dx_bcr",
            Field::DxChcr => "dx_chcr",
            Field::DxLen => "dx_len",
            Field::DxXadr => "dx_xadr",
            Field::Dpcr => "dpcr",
            Field::Dicr => "dicr",
            Field::DmaEnabled => "dma_enabled",
            Field::SpuWptr => "spu_wptr",
        }
    }
}

/// Byte-layout codec for the shared record
pub struct SharedState;

impl SharedState {
    /// Total record size in bytes
    pub const SIZE: usize = {
        let mut words = 0;
        let mut i = 0;
        while i < Field::ALL.len() {
            words += Field::ALL[i].words();
            i += 1;
        }
        words * 4
    };

    /// Byte offset of a field
    pub fn offset_of(field: Field) -> usize {
        Field::ALL
            .iter()
            .take_while(|&&f| f != field)
            .map(|f| f.bytes())
            .sum()
    }

    /// Serialize the whole machine into a fresh record
    pub fn export(system: &System) -> Vec<u8> {
        let mut state = vec![0u8; Self::SIZE];
        let bus = system.bus();

        put_words(&mut state, Field::DebugVram, bus.console().words());
        put(&mut state, Field::Xcomms, system.comms() as u32);
        put_bytes(&mut state, Field::Ram, bus.ram());
        put_vram(&mut state, bus.gpu().vram());
        put_bytes(&mut state, Field::Rom, bus.bios());
        put_bytes(&mut state, Field::Sram, bus.sram());
        put_bytes(&mut state, Field::Scratch, bus.scratchpad());

        Self::export_cpu(&mut state, &system.cpu().registers());
        Self::export_devices(&mut state, bus);

        state
    }

    fn export_cpu(state: &mut [u8], regs: &CpuRegisters) {
        put_words(state, Field::Regs, &regs.regs);
        put_words(state, Field::C0Regs, &regs.cop0);
        put(state, Field::Rlo, regs.lo);
        put(state, Field::Rhi, regs.hi);
        put(state, Field::LsAddr, regs.load_value);
        put(state, Field::LsReg, regs.load_reg);
        put(state, Field::LsOp, regs.load_op);
        put(state, Field::Pc, regs.pc);
        put(state, Field::PcDiff, regs.pc_diff);
        put(state, Field::FaultCause, regs.fault_cause);
        put(state, Field::FaultPc, regs.fault_pc);
    }

    fn export_devices(state: &mut [u8], bus: &Bus) {
        let gpu = bus.gpu();
        let fifo = gpu.fifo();
        put_words(state, Field::GpuFifo, fifo.words());
        put(state, Field::GpuStat, gpu.status());
        put(state, Field::GpuFifoBeg, fifo.beg() as u32);
        put(state, Field::GpuFifoEnd, fifo.end() as u32);
        put(state, Field::GpuY, gpu.line() as u32);

        put(state, Field::Seg7, bus.diagnostic().seg7());
        put(state, Field::IStat, bus.interrupt_controller().read_status());
        put(state, Field::IMask, bus.interrupt_controller().read_mask());

        let dma = bus.dma();
        for ch in 0..8 {
            let chan = dma.channel(ch);
            put_at(state, Field::DxMadr, ch, chan.base_address());
            put_at(state, Field::DxBcr, ch, chan.block_control());
            put_at(state, Field::DxChcr, ch, chan.channel_control());
            put_at(state, Field::DxLen, ch, chan.remaining());
            put_at(state, Field::DxXadr, ch, chan.cursor());
        }
        put(state, Field::Dpcr, dma.read_control());
        put(state, Field::Dicr, dma.read_interrupt());
        put(state, Field::DmaEnabled, dma.is_enabled() as u32);
        put(state, Field::SpuWptr, bus.spu().write_ptr());
    }

    /// Load a record into the machine
    ///
    /// `dma_enabled` is derived from `dpcr` and is not read back.
    ///
    /// # Errors
    ///
    /// `EmulatorError::StateLayout` if `state` is not exactly [`Self::SIZE`]
    /// bytes.
    pub fn import(system: &mut System, state: &[u8]) -> Result<()> {
        check_size(state)?;

        let xcomms = word(state, Field::Xcomms, 0) as i32;
        system.set_comms(xcomms);
        system.cpu_mut().restore(&Self::cpu_registers(state));

        let bus = system.bus_mut();
        bus.ram_mut().copy_from_slice(slice(state, Field::Ram));
        bus.sram_mut().copy_from_slice(slice(state, Field::Sram));
        bus.scratchpad_mut()
            .copy_from_slice(slice(state, Field::Scratch));
        bus.patch_bios(0, slice(state, Field::Rom))?;
        load_vram(bus.gpu_mut(), slice(state, Field::Vram));

        let grid: Vec<u32> = words(state, Field::DebugVram).collect();
        debug_assert_eq!(grid.len(), GRID_WORDS);
        bus.diagnostic_mut()
            .restore(&grid, word(state, Field::Seg7, 0));

        bus.interrupt_controller_mut()
            .restore(word(state, Field::IStat, 0), word(state, Field::IMask, 0));

        let mut fifo = [0u32; FIFO_SLOTS];
        for (slot, value) in fifo.iter_mut().zip(words(state, Field::GpuFifo)) {
            *slot = value;
        }
        bus.gpu_mut().restore(
            word(state, Field::GpuStat, 0),
            fifo,
            word(state, Field::GpuFifoBeg, 0),
            word(state, Field::GpuFifoEnd, 0),
            word(state, Field::GpuY, 0),
        );

        let mut channels = [[0u32; 5]; 8];
        for (ch, regs) in channels.iter_mut().enumerate() {
            *regs = [
                word(state, Field::DxMadr, ch),
                word(state, Field::DxBcr, ch),
                word(state, Field::DxChcr, ch),
                word(state, Field::DxLen, ch),
                word(state, Field::DxXadr, ch),
            ];
        }
        let dpcr = word(state, Field::Dpcr, 0);
        if (word(state, Field::DmaEnabled, 0) != 0) != (dpcr & 0x0888_8888 != 0) {
            warn!("Shared state dma_enabled disagrees with DPCR 0x{:08X}", dpcr);
        }
        bus.dma_mut()
            .restore(dpcr, word(state, Field::Dicr, 0), &channels);
        bus.spu_mut().restore(word(state, Field::SpuWptr, 0));

        debug!("Imported shared state ({} bytes)", state.len());
        Ok(())
    }

    fn cpu_registers(state: &[u8]) -> CpuRegisters {
        let mut regs = [0u32; 32];
        let mut cop0 = [0u32; 32];
        for (slot, value) in regs.iter_mut().zip(words(state, Field::Regs)) {
            *slot = value;
        }
        for (slot, value) in cop0.iter_mut().zip(words(state, Field::C0Regs)) {
            *slot = value;
        }
        CpuRegisters {
            regs,
            cop0,
            lo: word(state, Field::Rlo, 0),
            hi: word(state, Field::Rhi, 0),
            load_value: word(state, Field::LsAddr, 0),
            load_reg: word(state, Field::LsReg, 0),
            load_op: word(state, Field::LsOp, 0),
            pc: word(state, Field::Pc, 0),
            pc_diff: word(state, Field::PcDiff, 0),
            fault_cause: word(state, Field::FaultCause, 0),
            fault_pc: word(state, Field::FaultPc, 0),
        }
    }

    /// Host-side ROM preload into a raw record
    ///
    /// # Errors
    ///
    /// `StateLayout` for a wrongly sized record, `InvalidBiosSize` for a
    /// wrongly sized image.
    pub fn preload_rom(state: &mut [u8], image: &[u8]) -> Result<()> {
        check_size(state)?;
        if image.len() != Field::Rom.bytes() {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Field::Rom.bytes(),
                got: image.len(),
            });
        }
        slice_mut(state, Field::Rom).copy_from_slice(image);
        Ok(())
    }

    /// Host-side write of the communications flag into a raw record
    pub fn set_comms(state: &mut [u8], value: i32) -> Result<()> {
        check_size(state)?;
        put(state, Field::Xcomms, value as u32);
        Ok(())
    }

    /// Read word `index` of `field`
    ///
    /// Returns `None` when the record is too short or `index` is outside
    /// the field.
    pub fn read_word(state: &[u8], field: Field, index: usize) -> Option<u32> {
        if index >= field.words() {
            return None;
        }
        let offset = Self::offset_of(field) + index * 4;
        let bytes = state.get(offset..offset + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn check_size(state: &[u8]) -> Result<()> {
    if state.len() != SharedState::SIZE {
        return Err(EmulatorError::StateLayout {
            expected: SharedState::SIZE,
            got: state.len(),
        });
    }
    Ok(())
}

fn range(field: Field) -> std::ops::Range<usize> {
    let start = SharedState::offset_of(field);
    start..start + field.bytes()
}

fn slice(state: &[u8], field: Field) -> &[u8] {
    &state[range(field)]
}

fn slice_mut(state: &mut [u8], field: Field) -> &mut [u8] {
    &mut state[range(field)]
}

/// Words of a field in a size-checked record
fn words(state: &[u8], field: Field) -> impl Iterator<Item = u32> + '_ {
    slice(state, field)
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// One word of a field in a size-checked record
fn word(state: &[u8], field: Field, index: usize) -> u32 {
    SharedState::read_word(state, field, index).unwrap_or(0)
}

fn put(state: &mut [u8], field: Field, value: u32) {
    put_at(state, field, 0, value);
}

fn put_at(state: &mut [u8], field: Field, index: usize, value: u32) {
    let offset = SharedState::offset_of(field) + index * 4;
    state[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_words(state: &mut [u8], field: Field, values: &[u32]) {
    for (dest, value) in slice_mut(state, field).chunks_exact_mut(4).zip(values) {
        dest.copy_from_slice(&value.to_le_bytes());
    }
}

fn put_bytes(state: &mut [u8], field: Field, bytes: &[u8]) {
    let dest = slice_mut(state, field);
    let len = dest.len().min(bytes.len());
    dest[..len].copy_from_slice(&bytes[..len]);
}

/// VRAM pixels are packed two per word, lower address in the low half
fn put_vram(state: &mut [u8], vram: &[u16]) {
    for (dest, pixel) in slice_mut(state, Field::Vram).chunks_exact_mut(2).zip(vram) {
        dest.copy_from_slice(&pixel.to_le_bytes());
    }
}

fn load_vram(gpu: &mut GPU, bytes: &[u8]) {
    for (pixel, src) in gpu.vram_mut().iter_mut().zip(bytes.chunks_exact(2)) {
        *pixel = u16::from_le_bytes([src[0], src[1]]);
    }
}
