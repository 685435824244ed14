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

//! Core emulation components
//!
//! This module contains all hardware emulation components:
//! - CPU (MIPS R3000A with COP0)
//! - Memory bus and I/O dispatch
//! - Interrupt controller
//! - DMA controller
//! - GPU (command FIFO and rasterizer)
//! - Debug console overlay
//! - System integration (the tick driver)
//!
//! plus the boundaries around them: configuration, the shared-state record,
//! snapshots and framebuffer composition.

pub mod config;
pub mod console;
pub mod cpu;
pub mod display;
pub mod dma;
pub mod error;
pub mod gpu;
pub mod interrupt;
pub mod memory;
pub mod shared_state;
pub mod snapshot;
pub mod system;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use cpu::CPU;
pub use display::{Framebuffer, GlyphAtlas};
pub use dma::DMA;
pub use error::{EmulatorError, GpuError, Result};
pub use gpu::GPU;
pub use interrupt::InterruptController;
pub use memory::Bus;
pub use shared_state::SharedState;
pub use snapshot::Snapshot;
pub use system::System;
