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

//! Memory bus
//!
//! The Bus is the central component for all memory operations. It owns the
//! backing memories and every memory-mapped peripheral, decodes addresses
//! into exactly one region, and routes I/O accesses through an
//! address-dispatch table ([`IoMap`]) to the owning [`IODevice`].
//!
//! # Memory Map
//!
//! | Physical Address Range | Region       | Size   | Access |
//! |------------------------|--------------|--------|--------|
//! | 0x00000000-0x007FFFFF  | RAM          | 2MB ×4 | R/W    |
//! | 0x1F000000-0x1F0FFFFF  | SRAM         | 1MB    | R/W    |
//! | 0x1F400000-0x1F4FFFFF  | VRAM window  | 1MB    | R/W    |
//! | 0x1F800000-0x1F8003FF  | Scratchpad   | 1KB    | R/W    |
//! | 0x1F801000-0x1F802FFF  | I/O Ports    | 8KB    | R/W    |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS ROM     | 512KB  | R only |
//! | 0x1FFE0130             | Cache control| 4B     | R/W    |
//!
//! Anything else is unmapped and returns
//! [`EmulatorError::InvalidMemoryAccess`]; misaligned half-word and word
//! accesses return [`EmulatorError::UnalignedAccess`]. The CPU turns both
//! into exceptions.
//!
//! # Example
//!
//! ```
//! use xsp::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // Read from same location via different segment (should mirror)
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0x00200000).unwrap(), 0x12345678);
//! ```

mod io_device;
mod io_map;
mod latch;
mod region;
mod spu_port;

#[cfg(test)]
mod tests;

pub use io_device::IODevice;
pub use io_map::{IoMap, Port};
pub use latch::RegisterLatch;
pub use region::MemoryRegion;
pub use spu_port::SpuPort;

use crate::core::console::{Console, DiagnosticPort};
use crate::core::dma::DMA;
use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;
use crate::core::interrupt::{interrupts, InterruptController};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Memory bus owning all memories and peripherals
#[derive(Debug, Clone)]
pub struct Bus {
    /// Main RAM (2MB), mirrored over 0x00000000-0x007FFFFF
    ram: Vec<u8>,

    /// Auxiliary static RAM (1MB) at 0x1F000000
    sram: Vec<u8>,

    /// Scratchpad (1KB fast RAM) at 0x1F800000
    scratchpad: Vec<u8>,

    /// BIOS ROM (512KB) at 0x1FC00000, host-loaded only
    bios: Vec<u8>,

    /// Cache Control register (0xFFFE0130)
    cache_control: u32,

    io_map: IoMap,
    interrupt: InterruptController,
    dma: DMA,
    gpu: GPU,
    spu: SpuPort,
    diagnostic: DiagnosticPort,
    latch: RegisterLatch,
}

impl Bus {
    /// RAM size (2MB)
    pub const RAM_SIZE: usize = 2 * 1024 * 1024;

    /// Auxiliary SRAM size (1MB)
    pub const SRAM_SIZE: usize = 1024 * 1024;

    /// Scratchpad size (1KB)
    pub const SCRATCHPAD_SIZE: usize = 1024;

    /// BIOS size (512KB)
    pub const BIOS_SIZE: usize = 512 * 1024;

    /// Create a new Bus with zeroed memories and a default GPU
    pub fn new() -> Self {
        Self::with_gpu(GPU::new())
    }

    /// Create a new Bus around a preconfigured GPU
    pub fn with_gpu(gpu: GPU) -> Self {
        let interrupt = InterruptController::new();
        let dma = DMA::new();
        let spu = SpuPort::new();
        let diagnostic = DiagnosticPort::new();

        let mut io_map = IoMap::new(Self::IO_START);
        io_map
            .map_device(&interrupt, Port::Interrupt)
            .map_device(&dma, Port::Dma)
            .map_device(&gpu, Port::Gpu)
            .map_device(&spu, Port::Spu)
            .map_device(&diagnostic, Port::Diagnostic);

        Self {
            ram: vec![0u8; Self::RAM_SIZE],
            sram: vec![0u8; Self::SRAM_SIZE],
            scratchpad: vec![0u8; Self::SCRATCHPAD_SIZE],
            bios: vec![0u8; Self::BIOS_SIZE],
            cache_control: 0,
            io_map,
            interrupt,
            dma,
            gpu,
            spu,
            diagnostic,
            latch: RegisterLatch::new(Self::IO_START, Self::IO_END),
        }
    }

    /// Reset the bus to initial state
    ///
    /// Clears volatile memory and resets every peripheral. BIOS contents are
    /// preserved as they represent read-only ROM.
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x80000000, 0x12345678).unwrap();
    /// bus.reset();
    /// assert_eq!(bus.read32(0x80000000).unwrap(), 0x00000000);
    /// ```
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.sram.fill(0);
        self.scratchpad.fill(0);
        self.cache_control = 0;
        self.interrupt = InterruptController::new();
        self.dma = DMA::new();
        self.gpu.reset();
        self.spu.reset();
        self.diagnostic.reset();
        self.latch.reset();
    }

    /// Load BIOS from file
    ///
    /// The file must be exactly 512KB in size.
    ///
    /// # Errors
    ///
    /// - `EmulatorError::BiosNotFound` if the file cannot be opened
    /// - `EmulatorError::InvalidBiosSize` if the file is not 512KB
    /// - `EmulatorError::Io` if reading fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xsp::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_bios("SCPH5502.BIN").unwrap();
    /// ```
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|_| EmulatorError::BiosNotFound(path.display().to_string()))?;

        let metadata = file.metadata()?;

        if metadata.len() != Self::BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.bios)?;
        log::info!("BIOS loaded from {}", path.display());

        Ok(())
    }

    /// Load BIOS from an in-memory image (exactly 512KB)
    pub fn load_bios_bytes(&mut self, image: &[u8]) -> Result<()> {
        if image.len() != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: image.len(),
            });
        }
        self.bios.copy_from_slice(image);
        Ok(())
    }

    /// Host-side write into the BIOS region
    ///
    /// The CPU can never write ROM; this is the preload path used by the
    /// host and by synthetic-ROM tests.
    pub fn patch_bios(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len());
        match end.and_then(|end| self.bios.get_mut(offset..end)) {
            Some(dest) => {
                dest.copy_from_slice(data);
                Ok(())
            }
            None => Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: end.unwrap_or(usize::MAX),
            }),
        }
    }

    // Region and device accessors

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    pub fn sram(&self) -> &[u8] {
        &self.sram
    }

    pub(crate) fn sram_mut(&mut self) -> &mut [u8] {
        &mut self.sram
    }

    pub fn scratchpad(&self) -> &[u8] {
        &self.scratchpad
    }

    pub(crate) fn scratchpad_mut(&mut self) -> &mut [u8] {
        &mut self.scratchpad
    }

    pub fn bios(&self) -> &[u8] {
        &self.bios
    }

    pub fn cache_control(&self) -> u32 {
        self.cache_control
    }

    pub fn interrupt_controller(&self) -> &InterruptController {
        &self.interrupt
    }

    pub fn interrupt_controller_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupt
    }

    pub fn dma(&self) -> &DMA {
        &self.dma
    }

    pub fn dma_mut(&mut self) -> &mut DMA {
        &mut self.dma
    }

    pub fn gpu(&self) -> &GPU {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut GPU {
        &mut self.gpu
    }

    pub fn spu(&self) -> &SpuPort {
        &self.spu
    }

    pub(crate) fn spu_mut(&mut self) -> &mut SpuPort {
        &mut self.spu
    }

    pub fn diagnostic(&self) -> &DiagnosticPort {
        &self.diagnostic
    }

    pub fn diagnostic_mut(&mut self) -> &mut DiagnosticPort {
        &mut self.diagnostic
    }

    /// Console overlay fed by the diagnostic port
    pub fn console(&self) -> &Console {
        self.diagnostic.console()
    }

    pub fn console_mut(&mut self) -> &mut Console {
        self.diagnostic.console_mut()
    }

    /// I/O dispatch table
    pub fn io_map(&self) -> &IoMap {
        &self.io_map
    }

    /// Aggregated interrupt line for the CPU
    #[inline(always)]
    pub fn irq_pending(&self) -> bool {
        self.interrupt.is_pending()
    }

    /// Advance DMA by one unit and forward any interrupt edges
    pub fn tick_dma(&mut self) {
        if self.dma.step(&mut self.ram, &mut self.gpu) {
            self.interrupt.request(interrupts::DMA);
        }
        self.forward_irqs();
    }

    /// Move latched peripheral interrupt edges into I_STAT
    fn forward_irqs(&mut self) {
        if self.gpu.take_irq() {
            self.interrupt.request(interrupts::GPU);
        }
        if self.dma.take_irq() {
            self.interrupt.request(interrupts::DMA);
        }
    }

    // Memory access

    /// Read 8-bit value from memory
    ///
    /// 8-bit reads do not require alignment.
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write8(0x80000000, 0x42).unwrap();
    /// assert_eq!(bus.read8(0x80000000).unwrap(), 0x42);
    /// ```
    pub fn read8(&mut self, vaddr: u32) -> Result<u8> {
        self.load(vaddr, 1).map(|v| v as u8)
    }

    /// Read 16-bit value from memory (2-byte aligned)
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write16(0x80000000, 0x1234).unwrap();
    /// assert_eq!(bus.read16(0x80000000).unwrap(), 0x1234);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read16(0x80000001).is_err());
    /// ```
    pub fn read16(&mut self, vaddr: u32) -> Result<u16> {
        Self::check_alignment(vaddr, 2)?;
        self.load(vaddr, 2).map(|v| v as u16)
    }

    /// Read 32-bit value from memory (4-byte aligned)
    pub fn read32(&mut self, vaddr: u32) -> Result<u32> {
        Self::check_alignment(vaddr, 4)?;
        self.load(vaddr, 4)
    }

    /// Write 8-bit value to memory
    pub fn write8(&mut self, vaddr: u32, value: u8) -> Result<()> {
        self.store(vaddr, 1, value as u32)
    }

    /// Write 16-bit value to memory (2-byte aligned)
    pub fn write16(&mut self, vaddr: u32, value: u16) -> Result<()> {
        Self::check_alignment(vaddr, 2)?;
        self.store(vaddr, 2, value as u32)
    }

    /// Write 32-bit value to memory (4-byte aligned)
    ///
    /// Writes to BIOS ROM are ignored.
    pub fn write32(&mut self, vaddr: u32, value: u32) -> Result<()> {
        Self::check_alignment(vaddr, 4)?;
        self.store(vaddr, 4, value)
    }

    /// Side-effect-free word read for tracing and diagnostics
    ///
    /// Returns `None` for I/O registers, unmapped and misaligned addresses.
    pub fn peek32(&self, vaddr: u32) -> Option<u32> {
        if vaddr & 0x3 != 0 {
            return None;
        }
        let paddr = Self::translate_address(vaddr);
        match Self::region_of(paddr) {
            MemoryRegion::RAM => Some(read_le(&self.ram, Self::ram_offset(paddr), 4)),
            MemoryRegion::SRAM => Some(read_le(
                &self.sram,
                (paddr - Self::SRAM_START) as usize,
                4,
            )),
            MemoryRegion::VRAM => Some(self.read_vram_window(paddr - Self::VRAM_START, 4)),
            MemoryRegion::Scratchpad => Some(read_le(
                &self.scratchpad,
                (paddr - Self::SCRATCHPAD_START) as usize,
                4,
            )),
            MemoryRegion::BIOS => Some(read_le(
                &self.bios,
                (paddr - Self::BIOS_START) as usize,
                4,
            )),
            MemoryRegion::CacheControl => Some(self.cache_control),
            MemoryRegion::IO | MemoryRegion::Unmapped => None,
        }
    }

    #[inline(always)]
    fn check_alignment(vaddr: u32, size: u8) -> Result<()> {
        if vaddr & (size as u32 - 1) != 0 {
            return Err(EmulatorError::UnalignedAccess {
                address: vaddr,
                size,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn ram_offset(paddr: u32) -> usize {
        (paddr as usize) & (Self::RAM_SIZE - 1)
    }

    fn load(&mut self, vaddr: u32, size: usize) -> Result<u32> {
        let paddr = Self::translate_address(vaddr);

        match Self::region_of(paddr) {
            MemoryRegion::RAM => Ok(read_le(&self.ram, Self::ram_offset(paddr), size)),
            MemoryRegion::SRAM => Ok(read_le(
                &self.sram,
                (paddr - Self::SRAM_START) as usize,
                size,
            )),
            MemoryRegion::VRAM => Ok(self.read_vram_window(paddr - Self::VRAM_START, size)),
            MemoryRegion::Scratchpad => Ok(read_le(
                &self.scratchpad,
                (paddr - Self::SCRATCHPAD_START) as usize,
                size,
            )),
            MemoryRegion::BIOS => Ok(read_le(
                &self.bios,
                (paddr - Self::BIOS_START) as usize,
                size,
            )),
            MemoryRegion::IO => self.read_io(paddr, size),
            MemoryRegion::CacheControl => {
                let shift = (paddr & 0x3) * 8;
                Ok(self.cache_control >> shift)
            }
            MemoryRegion::Unmapped => {
                log::warn!("Unmapped read{} at 0x{:08X}", size * 8, vaddr);
                Err(EmulatorError::InvalidMemoryAccess { address: vaddr })
            }
        }
    }

    fn store(&mut self, vaddr: u32, size: usize, value: u32) -> Result<()> {
        let paddr = Self::translate_address(vaddr);

        match Self::region_of(paddr) {
            MemoryRegion::RAM => {
                write_le(&mut self.ram, Self::ram_offset(paddr), size, value);
            }
            MemoryRegion::SRAM => {
                write_le(
                    &mut self.sram,
                    (paddr - Self::SRAM_START) as usize,
                    size,
                    value,
                );
            }
            MemoryRegion::VRAM => self.write_vram_window(paddr - Self::VRAM_START, size, value),
            MemoryRegion::Scratchpad => {
                write_le(
                    &mut self.scratchpad,
                    (paddr - Self::SCRATCHPAD_START) as usize,
                    size,
                    value,
                );
            }
            MemoryRegion::BIOS => {
                log::trace!("Ignored write to BIOS at 0x{:08X}", vaddr);
            }
            MemoryRegion::IO => self.write_io(paddr, size, value)?,
            MemoryRegion::CacheControl => {
                let shift = (paddr & 0x3) * 8;
                let mask = size_mask(size) << shift;
                self.cache_control = (self.cache_control & !mask) | ((value << shift) & mask);
                log::debug!("Cache control = 0x{:08X}", self.cache_control);
            }
            MemoryRegion::Unmapped => {
                log::warn!(
                    "Unmapped write{} at 0x{:08X} (value 0x{:08X})",
                    size * 8,
                    vaddr,
                    value
                );
                return Err(EmulatorError::InvalidMemoryAccess { address: vaddr });
            }
        }
        Ok(())
    }

    fn device_mut(&mut self, port: Port) -> &mut dyn IODevice {
        match port {
            Port::Interrupt => &mut self.interrupt,
            Port::Dma => &mut self.dma,
            Port::Gpu => &mut self.gpu,
            Port::Spu => &mut self.spu,
            Port::Diagnostic => &mut self.diagnostic,
            Port::Latch => &mut self.latch,
        }
    }

    fn read_io(&mut self, paddr: u32, size: usize) -> Result<u32> {
        let (port, base) = self.io_map.lookup(paddr);
        let offset = paddr - base;
        let device = self.device_mut(port);

        let value = match size {
            1 => device.read_register8(offset)? as u32,
            2 => device.read_register16(offset)? as u32,
            _ => device.read_register(offset)?,
        };
        log::trace!(
            "{} read{} 0x{:08X} -> 0x{:08X}",
            device.name(),
            size * 8,
            paddr,
            value
        );
        Ok(value)
    }

    fn write_io(&mut self, paddr: u32, size: usize, value: u32) -> Result<()> {
        let (port, base) = self.io_map.lookup(paddr);
        let offset = paddr - base;
        let device = self.device_mut(port);

        log::trace!(
            "{} write{} 0x{:08X} = 0x{:08X}",
            device.name(),
            size * 8,
            paddr,
            value
        );
        match size {
            1 => device.write_register8(offset, value as u8)?,
            2 => device.write_register16(offset, value as u16)?,
            _ => device.write_register(offset, value)?,
        }

        self.forward_irqs();
        Ok(())
    }

    /// Little-endian read through the VRAM window (one pixel = 2 bytes)
    fn read_vram_window(&self, offset: u32, size: usize) -> u32 {
        let vram = self.gpu.vram();
        (0..size).rev().fold(0u32, |acc, i| {
            let byte_addr = offset as usize + i;
            let pixel = vram.get(byte_addr / 2).copied().unwrap_or(0);
            (acc << 8) | ((pixel >> ((byte_addr & 1) * 8)) & 0xFF) as u32
        })
    }

    fn write_vram_window(&mut self, offset: u32, size: usize, value: u32) {
        let vram = self.gpu.vram_mut();
        for i in 0..size {
            let byte_addr = offset as usize + i;
            let shift = (byte_addr & 1) * 8;
            if let Some(pixel) = vram.get_mut(byte_addr / 2) {
                let byte = ((value >> (i * 8)) & 0xFF) as u16;
                *pixel = (*pixel & !(0xFF << shift)) | (byte << shift);
            }
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn size_mask(size: usize) -> u32 {
    match size {
        1 => 0xFF,
        2 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}

/// Little-endian read of `size` bytes
#[inline(always)]
fn read_le(mem: &[u8], offset: usize, size: usize) -> u32 {
    match mem.get(offset..offset + size) {
        Some(bytes) => bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32),
        None => 0,
    }
}

/// Little-endian write of the low `size` bytes of `value`
#[inline(always)]
fn write_le(mem: &mut [u8], offset: usize, size: usize, value: u32) {
    if let Some(bytes) = mem.get_mut(offset..offset + size) {
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (value >> (i * 8)) as u8;
        }
    }
}
