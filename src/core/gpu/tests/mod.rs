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

//! GPU module tests
//!
//! - `basic`: initialization, reset, register access
//! - `fifo`: command FIFO cursors and packet assembly
//! - `vram`: VRAM access and transfers
//! - `gp0_commands`: drawing settings and packet decoding
//! - `gp1_commands`: display control and info queries
//! - `rendering`: primitives written into VRAM
//! - `timing`: raster line counter and vblank

use super::*;

mod fifo;

/// Encode a vertex word
fn vertex(x: i16, y: i16) -> u32 {
    ((y as u16 as u32) << 16) | (x as u16 as u32)
}
