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

//! System integration module
//!
//! Ties the CPU to the bus and its devices and provides the tick-driven
//! execution loop:
//!
//! ```text
//! tick():
//!     repeat instructions_per_tick:
//!         CPU step (interrupt check, fetch, execute, load retire)
//!         DMA step (every transferring channel advances one unit)
//!     GPU raster advances one line (VBLANK on wrap)
//! ```
//!
//! A tick does nothing until the host has set the communications flag with
//! [`System::set_comms`].

use std::path::Path;

use log::{debug, info, warn};

use super::config::Config;
use super::console::Console;
use super::cpu::{CpuTracer, CPU};
use super::error::Result;
use super::gpu::GPU;
use super::interrupt::interrupts;
use super::memory::Bus;

/// Console system
///
/// Owns the CPU and the bus (which owns every device).
///
/// # Example
/// ```
/// use xsp::core::system::System;
///
/// let mut system = System::new();
/// system.load_bios_bytes(&vec![0u8; 512 * 1024]).unwrap();
/// system.set_comms(1);
/// system.tick().unwrap();
/// assert_eq!(system.ticks(), 1);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,
    /// Memory bus and devices
    bus: Bus,
    /// Host communications flag; ticks are refused while it is 0
    comms: i32,
    /// The refused-tick warning has been logged
    comms_warned: bool,
    /// CPU steps per tick
    instructions_per_tick: u32,
    /// Completed ticks
    ticks: u64,
    /// Completed video frames
    frames: u64,
    /// CPU tracer for debugging (optional)
    tracer: Option<CpuTracer>,
    /// Maximum instructions to trace (0 = unlimited)
    trace_limit: usize,
    /// Number of instructions traced so far
    trace_count: usize,
}

impl System {
    /// Address of the BIOS B-function dispatcher (physical)
    const B_FUNCTION_ENTRY: u32 = 0x0000_00B0;

    /// B-function number of `putchar`
    const B_PUTCHAR: u32 = 0x3D;

    /// Create a system with default configuration
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a system using the timing values of `config`
    pub fn with_config(config: &Config) -> Self {
        let gpu = GPU::with_timing(config.lines_per_frame, config.vblank_start);
        info!(
            "System: {} instructions/tick, {} lines/frame (vblank at {})",
            config.instructions_per_tick, config.lines_per_frame, config.vblank_start
        );

        Self {
            cpu: CPU::new(),
            bus: Bus::with_gpu(gpu),
            comms: 0,
            comms_warned: false,
            instructions_per_tick: config.instructions_per_tick.max(1),
            ticks: 0,
            frames: 0,
            tracer: None,
            trace_limit: 0,
            trace_count: 0,
        }
    }

    /// Load BIOS from file
    ///
    /// The BIOS must be exactly 512KB.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xsp::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.load_bios("SCPH1001.BIN").unwrap();
    /// ```
    pub fn load_bios<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Load a BIOS image already in memory
    pub fn load_bios_bytes(&mut self, image: &[u8]) -> Result<()> {
        self.bus.load_bios_bytes(image)
    }

    /// Reset the system to its power-on state
    ///
    /// RAM and devices are cleared; the BIOS and the communications flag are
    /// kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.ticks = 0;
        self.frames = 0;
        self.trace_count = 0;
        info!("System reset");
    }

    /// Set the host communications flag
    pub fn set_comms(&mut self, value: i32) {
        if value != 0 && self.comms == 0 {
            info!("Host communications flag set ({})", value);
        }
        self.comms = value;
        self.comms_warned = false;
    }

    /// Current communications flag
    pub fn comms(&self) -> i32 {
        self.comms
    }

    /// Run one tick
    ///
    /// Executes `instructions_per_tick` CPU steps, draining DMA after each,
    /// then advances the GPU raster one line.
    ///
    /// # Errors
    ///
    /// Only host-level failures surface here; guest faults become CPU
    /// exceptions.
    pub fn tick(&mut self) -> Result<()> {
        if self.comms == 0 {
            if !self.comms_warned {
                warn!("Tick refused: communications flag not set");
                self.comms_warned = true;
            }
            return Ok(());
        }

        for _ in 0..self.instructions_per_tick {
            self.step()?;
        }

        if self.bus.gpu_mut().tick_line() {
            self.bus
                .interrupt_controller_mut()
                .request(interrupts::VBLANK);
            self.frames += 1;
            debug!("Frame {} complete", self.frames);
        }

        self.ticks += 1;
        Ok(())
    }

    /// Run ticks until the raster wraps
    pub fn run_frame(&mut self) -> Result<()> {
        if self.comms == 0 {
            return self.tick();
        }
        let frame = self.frames;
        while self.frames == frame {
            self.tick()?;
        }
        Ok(())
    }

    /// Execute one CPU instruction and one DMA step
    ///
    /// Ignores the communications flag; meant for tests and debuggers.
    ///
    /// # Returns
    /// Number of cycles consumed
    pub fn step(&mut self) -> Result<u32> {
        self.trace();
        self.intercept_putchar();

        let cycles = self.cpu.step(&mut self.bus)?;
        self.bus.tick_dma();
        Ok(cycles)
    }

    /// Execute `n` instructions
    pub fn step_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Copy BIOS `putchar` output to the console overlay
    ///
    /// The BIOS prints through B-function 3Dh; catching the call at the
    /// dispatcher gives TTY output without a serial device model.
    fn intercept_putchar(&mut self) {
        let pc = self.cpu.pc() & 0x1FFF_FFFF;
        if pc == Self::B_FUNCTION_ENTRY && self.cpu.reg(9) == Self::B_PUTCHAR {
            let ch = self.cpu.reg(4) as u8;
            self.bus.console_mut().put_char(ch);
        }
    }

    fn trace(&mut self) {
        let Some(tracer) = self.tracer.as_mut() else {
            return;
        };

        if self.trace_limit == 0 || self.trace_count < self.trace_limit {
            if let Err(e) = tracer.trace(&self.cpu, &self.bus) {
                warn!("Failed to write trace: {}", e);
            }
            self.trace_count += 1;
        } else if self.trace_count == self.trace_limit {
            info!(
                "Trace limit reached ({} instructions), stopping trace",
                self.trace_limit
            );
            let _ = tracer.flush();
            self.trace_count += 1;
        }
    }

    /// Get current PC value
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::system::System;
    ///
    /// let system = System::new();
    /// assert_eq!(system.pc(), 0xBFC00000);
    /// ```
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Retired instructions since reset
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }

    /// Completed ticks since reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Completed video frames since reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn instructions_per_tick(&self) -> u32 {
        self.instructions_per_tick
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn gpu(&self) -> &GPU {
        self.bus.gpu()
    }

    /// The debug overlay grid
    pub fn console(&self) -> &Console {
        self.bus.console()
    }

    /// Enable CPU execution tracing
    ///
    /// # Arguments
    ///
    /// * `path` - Output file
    /// * `limit` - Maximum instructions to trace (0 = unlimited)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xsp::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.enable_tracing("trace.log", 5000).unwrap();
    /// ```
    pub fn enable_tracing<P: AsRef<Path>>(&mut self, path: P, limit: usize) -> Result<()> {
        self.tracer = Some(CpuTracer::new(path)?);
        self.trace_limit = limit;
        self.trace_count = 0;
        Ok(())
    }

    /// Disable CPU execution tracing, flushing the file
    pub fn disable_tracing(&mut self) {
        if let Some(mut tracer) = self.tracer.take() {
            let _ = tracer.flush();
            info!(
                "CPU tracing disabled (traced {} instructions)",
                self.trace_count
            );
            self.trace_limit = 0;
            self.trace_count = 0;
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    /// Number of instructions traced so far
    pub fn trace_count(&self) -> usize {
        self.trace_count
    }

    /// Restore tick and frame counters (used by snapshot import)
    pub(crate) fn restore_counters(&mut self, ticks: u64, frames: u64) {
        self.ticks = ticks;
        self.frames = frames;
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
