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

//! Memory-mapped peripheral interface
//!
//! Every register window in the I/O region is owned by one peripheral that
//! implements [`IODevice`]. The bus keeps an address-dispatch table of these
//! windows (see [`IoMap`](super::IoMap)) and hands each access to the owning
//! device with a window-relative offset, so peripherals never see raw bus
//! addresses and never alias each other.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Memory Bus                     │
//! ├─────────────────────────────────────────────┤
//! │  IoMap: [(start, end, Port)]                │
//! │                                             │
//! │  read_io(addr) {                            │
//! │    let (port, base) = io_map.lookup(addr);  │
//! │    device(port).read_register(addr - base)  │
//! │  }                                          │
//! └─────────────────────────────────────────────┘
//!        ▲              ▲               ▲
//!        │              │               │
//!   ┌────┴────┐   ┌─────┴─────┐   ┌─────┴─────┐
//!   │  IRQ    │   │   DMA     │   │   GPU     │
//!   └─────────┘   └───────────┘   └───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use xsp::core::memory::IODevice;
//! use xsp::core::error::Result;
//!
//! struct MyPeripheral {
//!     base_addr: u32,
//!     registers: [u32; 4],
//! }
//!
//! impl IODevice for MyPeripheral {
//!     fn address_range(&self) -> (u32, u32) {
//!         (self.base_addr, self.base_addr + 0x0F)
//!     }
//!
//!     fn read_register(&mut self, offset: u32) -> Result<u32> {
//!         let index = (offset / 4) as usize;
//!         Ok(self.registers.get(index).copied().unwrap_or(0))
//!     }
//!
//!     fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
//!         let index = (offset / 4) as usize;
//!         if index < self.registers.len() {
//!             self.registers[index] = value;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut dev = MyPeripheral { base_addr: 0x1F80_1000, registers: [0; 4] };
//! dev.write_register16(0x4, 0xBEEF).unwrap();
//! assert_eq!(dev.read_register(0x4).unwrap(), 0xBEEF);
//! ```

use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// Devices must implement the 32-bit accessors; 8-bit and 16-bit access
/// default to a read-modify-write of the containing word. Devices whose
/// registers have side effects on read or write (FIFOs, write-1-to-clear
/// status) override the narrow accessors.
///
/// Reads take `&mut self` because several registers are consuming reads
/// (GPUREAD pops a VRAM transfer word).
pub trait IODevice {
    /// Get the address range this device responds to
    ///
    /// # Returns
    ///
    /// `(start, end)` - Start and end physical addresses (inclusive)
    fn address_range(&self) -> (u32, u32);

    /// Check if this device contains the given physical address
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read a 32-bit value from a device register
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset from device base address
    fn read_register(&mut self, offset: u32) -> Result<u32>;

    /// Write a 32-bit value to a device register
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset from device base address
    /// * `value` - 32-bit value to write
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Read a 16-bit value from a device register
    ///
    /// Default implementation reads the 32-bit value and extracts the half.
    fn read_register16(&mut self, offset: u32) -> Result<u16> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x02) * 8;
        Ok(((value >> shift) & 0xFFFF) as u16)
    }

    /// Write a 16-bit value to a device register
    ///
    /// Default implementation performs read-modify-write on the aligned
    /// 32-bit word, updating only the targeted half.
    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x02) * 8;
        let mask = !(0xFFFFu32 << shift);
        let current = self.read_register(aligned)?;
        let new_value = (current & mask) | ((value as u32) << shift);
        self.write_register(aligned, new_value)
    }

    /// Read an 8-bit value from a device register
    fn read_register8(&mut self, offset: u32) -> Result<u8> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x03) * 8;
        Ok(((value >> shift) & 0xFF) as u8)
    }

    /// Write an 8-bit value to a device register
    ///
    /// Default implementation performs read-modify-write on the aligned
    /// 32-bit word, updating only the targeted byte.
    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x03) * 8;
        let mask = !(0xFFu32 << shift);
        let current = self.read_register(aligned)?;
        let new_value = (current & mask) | ((value as u32) << shift);
        self.write_register(aligned, new_value)
    }

    /// Device name for logging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EmulatorError;

    /// Mock device for testing
    struct MockDevice {
        base: u32,
        registers: Vec<u32>,
        reads: usize,
    }

    impl MockDevice {
        fn new(base: u32, register_count: usize) -> Self {
            Self {
                base,
                registers: vec![0; register_count],
                reads: 0,
            }
        }
    }

    impl IODevice for MockDevice {
        fn address_range(&self) -> (u32, u32) {
            (self.base, self.base + (self.registers.len() as u32 * 4) - 1)
        }

        fn read_register(&mut self, offset: u32) -> Result<u32> {
            self.reads += 1;
            let index = (offset / 4) as usize;
            self.registers
                .get(index)
                .copied()
                .ok_or(EmulatorError::InvalidMemoryAccess {
                    address: self.base + offset,
                })
        }

        fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
            let index = (offset / 4) as usize;
            match self.registers.get_mut(index) {
                Some(reg) => {
                    *reg = value;
                    Ok(())
                }
                None => Err(EmulatorError::InvalidMemoryAccess {
                    address: self.base + offset,
                }),
            }
        }

        fn name(&self) -> &str {
            "MockDevice"
        }
    }

    #[test]
    fn test_contains() {
        let device = MockDevice::new(0x1F801000, 4);

        assert_eq!(device.address_range(), (0x1F801000, 0x1F80100F));
        assert!(device.contains(0x1F801000));
        assert!(device.contains(0x1F80100F));
        assert!(!device.contains(0x1F800FFF));
        assert!(!device.contains(0x1F801010));
    }

    #[test]
    fn test_narrow_writes_merge_into_word() {
        let mut device = MockDevice::new(0x1F801000, 4);
        device.write_register(0x04, 0x1122_3344).unwrap();

        device.write_register16(0x06, 0xAABB).unwrap();
        assert_eq!(device.read_register(0x04).unwrap(), 0xAABB_3344);

        device.write_register8(0x05, 0xCC).unwrap();
        assert_eq!(device.read_register(0x04).unwrap(), 0xAABB_CC44);

        assert_eq!(device.read_register16(0x06).unwrap(), 0xAABB);
        assert_eq!(device.read_register8(0x05).unwrap(), 0xCC);
    }

    #[test]
    fn test_reads_go_through_device() {
        let mut device = MockDevice::new(0x1F801000, 1);
        device.read_register8(0x02).unwrap();
        device.read_register16(0x00).unwrap();
        assert_eq!(device.reads, 2);
    }

    #[test]
    fn test_out_of_range() {
        let mut device = MockDevice::new(0x1F801000, 4);

        assert!(device.read_register(0x10).is_err());
        assert!(device.write_register(0x10, 0).is_err());
        assert_eq!(device.name(), "MockDevice");
    }
}
