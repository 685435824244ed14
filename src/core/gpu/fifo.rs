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

//! GP0 command FIFO
//!
//! A 16-slot ring of command words addressed by a begin and an end cursor.
//! One slot is always left empty so `beg == end` unambiguously means empty,
//! which gives the queue a usable capacity of 15 words. The longest GP0
//! packet (shaded textured quad) is 12 words, so a complete packet always
//! fits.

/// Number of slots in the ring
pub const FIFO_SLOTS: usize = 16;

/// Ring buffer of GP0 words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandFifo {
    words: [u32; FIFO_SLOTS],
    beg: usize,
    end: usize,
}

impl CommandFifo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered words
    pub fn len(&self) -> usize {
        (self.end + FIFO_SLOTS - self.beg) % FIFO_SLOTS
    }

    pub fn is_empty(&self) -> bool {
        self.beg == self.end
    }

    pub fn is_full(&self) -> bool {
        (self.end + 1) % FIFO_SLOTS == self.beg
    }

    /// Append a word
    ///
    /// Returns `false` and leaves the queue untouched when it is full.
    pub fn push(&mut self, word: u32) -> bool {
        if self.is_full() {
            return false;
        }
        self.words[self.end] = word;
        self.end = (self.end + 1) % FIFO_SLOTS;
        true
    }

    /// Remove and return the oldest word
    pub fn pop(&mut self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let word = self.words[self.beg];
        self.beg = (self.beg + 1) % FIFO_SLOTS;
        Some(word)
    }

    /// Look at the word `index` positions behind the head
    pub fn peek(&self, index: usize) -> Option<u32> {
        if index >= self.len() {
            return None;
        }
        Some(self.words[(self.beg + index) % FIFO_SLOTS])
    }

    /// Drain `count` words into `out`, returning the filled prefix
    pub fn pop_into<'a>(&mut self, count: usize, out: &'a mut [u32]) -> &'a [u32] {
        let count = count.min(self.len()).min(out.len());
        for slot in out.iter_mut().take(count) {
            *slot = self.words[self.beg];
            self.beg = (self.beg + 1) % FIFO_SLOTS;
        }
        &out[..count]
    }

    pub fn clear(&mut self) {
        self.beg = 0;
        self.end = 0;
    }

    /// Raw slot contents
    pub fn words(&self) -> &[u32; FIFO_SLOTS] {
        &self.words
    }

    /// Begin (read) cursor
    pub fn beg(&self) -> usize {
        self.beg
    }

    /// End (write) cursor
    pub fn end(&self) -> usize {
        self.end
    }

    /// Rebuild the ring from raw slots and cursors
    pub(crate) fn restore(&mut self, words: [u32; FIFO_SLOTS], beg: u32, end: u32) {
        self.words = words;
        self.beg = beg as usize % FIFO_SLOTS;
        self.end = end as usize % FIFO_SLOTS;
    }
}
