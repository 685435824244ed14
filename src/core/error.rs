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

//! Emulator error types
//!
//! Only host-level failures surface through these types. Faults raised by
//! software running inside the emulated machine (bus errors, reserved
//! opcodes, overflow) are turned into CPU exceptions by the execution engine
//! and never abort a tick.

use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("Invalid memory access at 0x{address:08X}")]
    InvalidMemoryAccess { address: u32 },

    #[error("Unaligned memory access: {size}-byte access at 0x{address:08X}")]
    UnalignedAccess { address: u32, size: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shared state layout mismatch: {got} bytes (expected {expected})")]
    StateLayout { expected: usize, got: usize },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Glyph atlas error: {0}")]
    GlyphAtlas(String),

    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

/// GPU-specific error types
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("Invalid VRAM access at ({x}, {y})")]
    InvalidVramAccess { x: u16, y: u16 },

    #[error("Invalid GP0 command: {command:#010x}")]
    InvalidGp0Command { command: u32 },

    #[error("Invalid GP1 command: {command:#010x}")]
    InvalidGp1Command { command: u32 },
}
