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

//! Interrupt Controller
//!
//! The interrupt controller latches requests from every peripheral into a
//! status register and exposes one aggregated line to the CPU.
//!
//! ## Registers
//!
//! - **I_STAT** (0x1F801070): Interrupt status register (R/W)
//!   - Reading returns current interrupt flags
//!   - Writing 1 to a bit acknowledges that interrupt (clears the bit)
//!   - Writing 0 to a bit leaves it untouched
//!
//! - **I_MASK** (0x1F801074): Interrupt mask register (R/W)
//!   - Controls which interrupts can reach the CPU
//!   - 1 = interrupt enabled, 0 = interrupt masked
//!
//! Pending bits are level latches: a source raised while masked stays
//! pending and surfaces as soon as the mask admits it.
//!
//! ## Interrupt Sources (Bit Positions)
//!
//! ```text
//! Bit  | Source        | Description
//! -----|---------------|----------------------------------
//! 0    | VBLANK        | Vertical blank (raster line wrap)
//! 1    | GPU           | GP0(1Fh) interrupt request
//! 2    | CDROM         | CD-ROM controller
//! 3    | DMA           | DMA master flag rising edge
//! 4    | TIMER0        | Timer 0 interrupt
//! 5    | TIMER1        | Timer 1 interrupt
//! 6    | TIMER2        | Timer 2 interrupt
//! 7    | CONTROLLER    | Controller/memory card
//! 8    | SIO           | Serial I/O
//! 9    | SPU           | Sound processing unit
//! 10   | LIGHTPEN      | Lightpen/IRQ10 (PIO)
//! 11-15| -             | Not used, always read as 0
//! ```

use crate::core::error::Result;
use crate::core::memory::IODevice;

#[cfg(test)]
mod tests;

/// Interrupt source bit flags
///
/// These constants represent the bit positions in I_STAT and I_MASK registers
/// for each interrupt source.
pub mod interrupts {
    /// Vertical blank interrupt (bit 0)
    pub const VBLANK: u16 = 1 << 0;

    /// GPU interrupt request (bit 1)
    pub const GPU: u16 = 1 << 1;

    /// CD-ROM controller interrupt (bit 2)
    pub const CDROM: u16 = 1 << 2;

    /// DMA transfer complete interrupt (bit 3)
    pub const DMA: u16 = 1 << 3;

    /// Timer 0 interrupt (bit 4)
    pub const TIMER0: u16 = 1 << 4;

    /// Timer 1 interrupt (bit 5)
    pub const TIMER1: u16 = 1 << 5;

    /// Timer 2 interrupt (bit 6)
    pub const TIMER2: u16 = 1 << 6;

    /// Controller/memory card interrupt (bit 7)
    pub const CONTROLLER: u16 = 1 << 7;

    /// Serial I/O interrupt (bit 8)
    pub const SIO: u16 = 1 << 8;

    /// Sound processing unit interrupt (bit 9)
    pub const SPU: u16 = 1 << 9;

    /// Lightpen/IRQ10 (PIO) interrupt (bit 10)
    pub const LIGHTPEN: u16 = 1 << 10;

    /// All implemented source bits
    pub const ALL: u16 = 0x07FF;
}

/// PlayStation Interrupt Controller
///
/// # Example
///
/// ```
/// use xsp::core::interrupt::{InterruptController, interrupts};
///
/// let mut ic = InterruptController::new();
///
/// // Request VBLANK interrupt
/// ic.request(interrupts::VBLANK);
///
/// // Enable VBLANK interrupts
/// ic.write_mask(interrupts::VBLANK as u32);
///
/// // Check if any interrupt is pending
/// assert!(ic.is_pending());
///
/// // Acknowledge the interrupt (write 1 to clear)
/// ic.write_status(interrupts::VBLANK as u32);
/// assert!(!ic.is_pending());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    /// I_STAT (0x1F801070) - pending sources
    status: u16,

    /// I_MASK (0x1F801074) - enabled sources
    mask: u16,
}

impl InterruptController {
    /// I_STAT physical address
    pub const I_STAT: u32 = 0x1F80_1070;

    /// I_MASK physical address
    pub const I_MASK: u32 = 0x1F80_1074;

    /// Create a new interrupt controller
    ///
    /// Initializes with all interrupts cleared and masked.
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::interrupt::InterruptController;
    ///
    /// let ic = InterruptController::new();
    /// assert_eq!(ic.read_status(), 0);
    /// assert_eq!(ic.read_mask(), 0);
    /// ```
    pub fn new() -> Self {
        Self { status: 0, mask: 0 }
    }

    /// Request an interrupt
    ///
    /// ORs the given source bit(s) into the status register. A request never
    /// clears a bit, so raising an already pending source is a no-op.
    ///
    /// # Arguments
    ///
    /// * `interrupt` - Interrupt bit(s) to set (can be multiple ORed together)
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::interrupt::{InterruptController, interrupts};
    ///
    /// let mut ic = InterruptController::new();
    /// ic.request(interrupts::VBLANK);
    /// ic.request(interrupts::VBLANK);
    /// assert_eq!(ic.read_status(), interrupts::VBLANK as u32);
    /// ```
    pub fn request(&mut self, interrupt: u16) {
        self.status |= interrupt & interrupts::ALL;
        log::trace!(
            "IRQ requested: 0x{:04X}, status=0x{:04X}",
            interrupt,
            self.status
        );
    }

    /// Acknowledge interrupts (write 1 to clear)
    ///
    /// Clears exactly the bits set in `value`; every other pending bit is
    /// left as it was.
    ///
    /// # Arguments
    ///
    /// * `value` - Bits to clear
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::interrupt::{InterruptController, interrupts};
    ///
    /// let mut ic = InterruptController::new();
    /// ic.request(interrupts::VBLANK | interrupts::TIMER0);
    ///
    /// ic.acknowledge(interrupts::VBLANK);
    /// assert_eq!(ic.read_status(), interrupts::TIMER0 as u32);
    /// ```
    pub fn acknowledge(&mut self, value: u16) {
        self.status &= !value;
        log::trace!("IRQ acknowledged, status=0x{:04X}", self.status);
    }

    /// Aggregated interrupt line seen by the CPU
    ///
    /// # Returns
    ///
    /// true if (status & mask) != 0, false otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::interrupt::{InterruptController, interrupts};
    ///
    /// let mut ic = InterruptController::new();
    ///
    /// // Request interrupt but it's masked
    /// ic.request(interrupts::VBLANK);
    /// assert!(!ic.is_pending());
    ///
    /// // Unmask the interrupt
    /// ic.write_mask(interrupts::VBLANK as u32);
    /// assert!(ic.is_pending());
    /// ```
    #[inline]
    pub fn is_pending(&self) -> bool {
        (self.status & self.mask) != 0
    }

    /// Read I_STAT register
    pub fn read_status(&self) -> u32 {
        self.status as u32
    }

    /// Write I_STAT register (acknowledge)
    ///
    /// # Arguments
    ///
    /// * `value` - Value written by the CPU; 1 bits clear the matching sources
    pub fn write_status(&mut self, value: u32) {
        self.acknowledge(value as u16);
    }

    /// Read I_MASK register
    pub fn read_mask(&self) -> u32 {
        self.mask as u32
    }

    /// Write I_MASK register
    ///
    /// Replaces the mask. Bits above the last source are discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::interrupt::{InterruptController, interrupts};
    ///
    /// let mut ic = InterruptController::new();
    /// ic.write_mask((interrupts::VBLANK | interrupts::DMA) as u32);
    /// assert_eq!(ic.read_mask(), (interrupts::VBLANK | interrupts::DMA) as u32);
    /// ```
    pub fn write_mask(&mut self, value: u32) {
        self.mask = (value as u16) & interrupts::ALL;
        log::debug!("IRQ mask set: 0x{:04X}", self.mask);
    }

    /// Restore raw register values (shared-state import)
    pub(crate) fn restore(&mut self, status: u32, mask: u32) {
        self.status = (status as u16) & interrupts::ALL;
        self.mask = (mask as u16) & interrupts::ALL;
    }
}

impl IODevice for InterruptController {
    fn address_range(&self) -> (u32, u32) {
        (Self::I_STAT, Self::I_MASK + 3)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        Ok(match offset & !0x3 {
            0x0 => self.read_status(),
            _ => self.read_mask(),
        })
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset & !0x3 {
            0x0 => self.write_status(value),
            _ => self.write_mask(value),
        }
        Ok(())
    }

    // I_STAT is write-1-to-clear, so a narrow store must not read-modify-write
    // the neighbouring bits back into the register.
    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let shift = (offset & 0x2) * 8;
        match offset & !0x3 {
            0x0 => self.write_status((value as u32) << shift),
            _ => {
                let keep = self.read_mask() & !(0xFFFF << shift);
                self.write_mask(keep | ((value as u32) << shift));
            }
        }
        Ok(())
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let shift = (offset & 0x3) * 8;
        match offset & !0x3 {
            0x0 => self.write_status((value as u32) << shift),
            _ => {
                let keep = self.read_mask() & !(0xFF << shift);
                self.write_mask(keep | ((value as u32) << shift));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Interrupt Controller"
    }
}
