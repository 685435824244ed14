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

//! I/O address-dispatch table
//!
//! Maps each register window of the I/O region to the peripheral that owns
//! it. Lookups return the owning [`Port`] and the window base, so the bus can
//! hand the device a window-relative offset. Addresses inside the I/O region
//! that no window claims fall through to the generic register latch.

use super::IODevice;

/// Peripheral owning an I/O window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// I_STAT / I_MASK
    Interrupt,
    /// DMA channels, DPCR, DICR
    Dma,
    /// GP0/GPUREAD and GP1/GPUSTAT
    Gpu,
    /// SPU register latch
    Spu,
    /// DUART and POST display
    Diagnostic,
    /// Everything not modeled
    Latch,
}

/// One dispatch entry: inclusive physical range and owner
#[derive(Debug, Clone, Copy)]
struct Window {
    start: u32,
    end: u32,
    port: Port,
}

/// Address-dispatch table over the I/O region
#[derive(Debug, Clone)]
pub struct IoMap {
    windows: Vec<Window>,
    fallback_base: u32,
}

impl IoMap {
    /// Create an empty table; every lookup hits the fallback latch
    pub fn new(fallback_base: u32) -> Self {
        Self {
            windows: Vec::new(),
            fallback_base,
        }
    }

    /// Add a window
    ///
    /// Windows must not overlap: each address resolves to exactly one owner.
    pub fn map(&mut self, start: u32, end: u32, port: Port) -> &mut Self {
        debug_assert!(start <= end);
        debug_assert!(
            self.windows.iter().all(|w| end < w.start || start > w.end),
            "I/O window 0x{:08X}-0x{:08X} overlaps an existing window",
            start,
            end
        );
        self.windows.push(Window { start, end, port });
        self
    }

    /// Add a window covering a device's own address range
    pub fn map_device(&mut self, device: &impl IODevice, port: Port) -> &mut Self {
        let (start, end) = device.address_range();
        self.map(start, end, port)
    }

    /// Resolve a physical address to its owner and window base
    pub fn lookup(&self, paddr: u32) -> (Port, u32) {
        self.windows
            .iter()
            .find(|w| (w.start..=w.end).contains(&paddr))
            .map(|w| (w.port, w.start))
            .unwrap_or((Port::Latch, self.fallback_base))
    }

    /// Mapped windows as `(start, end, port)`
    pub fn windows(&self) -> impl Iterator<Item = (u32, u32, Port)> + '_ {
        self.windows.iter().map(|w| (w.start, w.end, w.port))
    }
}
