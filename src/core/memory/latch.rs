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

//! Plain register latch for I/O windows without a device model
//!
//! Memory control, timers, the controller SIO and the CD-ROM controller are
//! not emulated, but kernels still configure them. Their registers behave as
//! plain storage so configuration writes read back unchanged.

use super::IODevice;
use crate::core::error::Result;

/// Word-addressed storage covering a whole register window
#[derive(Debug, Clone)]
pub struct RegisterLatch {
    start: u32,
    end: u32,
    words: Vec<u32>,
}

impl RegisterLatch {
    /// Create a zeroed latch for `start..=end`
    pub fn new(start: u32, end: u32) -> Self {
        let len = ((end - start) / 4 + 1) as usize;
        Self {
            start,
            end,
            words: vec![0; len],
        }
    }

    /// Zero every latched register
    pub fn reset(&mut self) {
        self.words.fill(0);
    }

    #[inline(always)]
    fn index(&self, offset: u32) -> usize {
        (offset / 4) as usize
    }
}

impl IODevice for RegisterLatch {
    fn address_range(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        Ok(self.words.get(self.index(offset)).copied().unwrap_or(0))
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let index = self.index(offset);
        if let Some(word) = self.words.get_mut(index) {
            log::trace!(
                "Latch write 0x{:08X} = 0x{:08X}",
                self.start + offset,
                value
            );
            *word = value;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Register Latch"
    }
}
