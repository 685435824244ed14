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

use super::*;

/// Bus whose BIOS starts with a recognizable word pattern
pub fn bus_with_bios_pattern() -> Bus {
    let mut bus = Bus::new();
    let mut image = vec![0u8; Bus::BIOS_SIZE];
    for (i, chunk) in image.chunks_exact_mut(4).enumerate().take(16) {
        chunk.copy_from_slice(&(0xB105_0000 + i as u32).to_le_bytes());
    }
    bus.load_bios_bytes(&image).unwrap();
    bus
}
