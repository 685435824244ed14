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

//! CPU execution tracer for debugging
//!
//! Logs one line per instruction to a file for offline analysis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{Disassembler, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

/// CPU execution tracer
///
/// Each line in the trace file shows:
/// - Program counter
/// - Raw instruction encoding
/// - Disassembled instruction
/// - Values of selected registers (r1-r3 by default)
///
/// The instruction word is read with [`Bus::peek32`], so tracing never
/// triggers I/O side effects.
///
/// # Example
/// ```no_run
/// use xsp::core::cpu::{CPU, CpuTracer};
/// use xsp::core::memory::Bus;
///
/// let mut cpu = CPU::new();
/// let mut bus = Bus::new();
/// let mut tracer = CpuTracer::new("trace.log").unwrap();
///
/// tracer.trace(&cpu, &bus).unwrap();
/// cpu.step(&mut bus).unwrap();
/// ```
pub struct CpuTracer {
    /// Enable/disable tracing
    enabled: bool,
    /// Buffered output file
    output: BufWriter<File>,
    /// Lines written so far
    lines: u64,
}

impl CpuTracer {
    /// Create a new CPU tracer
    ///
    /// Opens a file for writing trace output. If the file exists, it will be
    /// overwritten.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let output = BufWriter::new(File::create(path.as_ref())?);
        log::info!("CPU trace enabled: {}", path.as_ref().display());
        Ok(Self {
            enabled: true,
            output,
            lines: 0,
        })
    }

    /// Enable or disable tracing
    ///
    /// When disabled, trace() calls return immediately without writing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if tracing is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of instructions traced
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Trace the instruction at the CPU's PC with r1, r2 and r3
    pub fn trace(&mut self, cpu: &CPU, bus: &Bus) -> Result<()> {
        self.trace_with_regs(cpu, bus, &[1, 2, 3])
    }

    /// Trace with custom register selection
    ///
    /// # Arguments
    ///
    /// * `cpu` - CPU instance to trace
    /// * `bus` - Memory bus for fetching the instruction word
    /// * `regs` - Register numbers to display (at most 8 are written)
    pub fn trace_with_regs(&mut self, cpu: &CPU, bus: &Bus, regs: &[u8]) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let pc = cpu.pc();
        match bus.peek32(pc) {
            Some(word) => write!(
                self.output,
                "PC=0x{:08X} [0x{:08X}] {:30} |",
                pc,
                word,
                Disassembler::disassemble(word, pc)
            )?,
            None => write!(
                self.output,
                "PC=0x{:08X} [----------] {:30} |",
                pc, "<unreadable>"
            )?,
        }

        for &reg in regs.iter().take(8) {
            write!(self.output, " r{}={:08X}", reg, cpu.reg(reg))?;
        }
        writeln!(self.output)?;

        self.lines += 1;
        Ok(())
    }

    /// Flush the output buffer
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracer_in(dir: &TempDir) -> (CpuTracer, std::path::PathBuf) {
        let path = dir.path().join("trace.log");
        (CpuTracer::new(&path).unwrap(), path)
    }

    #[test]
    fn test_tracer_enable_disable() {
        let dir = TempDir::new().unwrap();
        let (mut tracer, _) = tracer_in(&dir);
        assert!(tracer.is_enabled());

        tracer.set_enabled(false);
        assert!(!tracer.is_enabled());

        tracer.set_enabled(true);
        assert!(tracer.is_enabled());
    }

    #[test]
    fn test_tracer_basic_trace() {
        let dir = TempDir::new().unwrap();
        let (mut tracer, path) = tracer_in(&dir);
        let cpu = CPU::new();
        let bus = Bus::new();

        tracer.trace(&cpu, &bus).unwrap();
        tracer.flush().unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("PC=0xBFC00000"));
        assert!(contents.contains("nop"));
        assert_eq!(tracer.lines(), 1);
    }

    #[test]
    fn test_tracer_disabled_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut tracer, path) = tracer_in(&dir);
        tracer.set_enabled(false);

        tracer.trace(&CPU::new(), &Bus::new()).unwrap();
        tracer.flush().unwrap();

        assert!(std::fs::read_to_string(path).unwrap().is_empty());
        assert_eq!(tracer.lines(), 0);
    }

    #[test]
    fn test_tracer_with_custom_regs() {
        let dir = TempDir::new().unwrap();
        let (mut tracer, path) = tracer_in(&dir);
        let mut cpu = CPU::new();
        cpu.set_reg(4, 0x12345678);
        cpu.set_reg(5, 0xABCDEF00);

        tracer.trace_with_regs(&cpu, &Bus::new(), &[4, 5]).unwrap();
        tracer.flush().unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("r4=12345678"));
        assert!(contents.contains("r5=ABCDEF00"));
    }

    #[test]
    fn test_tracer_unreadable_pc() {
        let dir = TempDir::new().unwrap();
        let (mut tracer, path) = tracer_in(&dir);
        let mut cpu = CPU::new();
        cpu.set_pc(0x1F80_1810);

        tracer.trace(&cpu, &Bus::new()).unwrap();
        tracer.flush().unwrap();

        assert!(std::fs::read_to_string(path)
            .unwrap()
            .contains("<unreadable>"));
    }
}
