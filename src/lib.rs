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

//! Tick-driven PlayStation-class console engine
//!
//! This library provides a MIPS R3000A CPU with load-delay and exception
//! semantics, the memory bus, an interrupt controller, an 8-channel DMA
//! controller and a command-FIFO GPU, all advanced one host tick at a time.
//!
//! # Example
//!
//! ```
//! use xsp::core::cpu::CPU;
//! use xsp::core::memory::Bus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = Bus::new();
//!
//! // BIOS is zeroed: the first instruction is a NOP
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.pc(), 0xBFC00004);
//! ```

pub mod core;
