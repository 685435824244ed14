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

use std::fmt::Write as _;

use log::{debug, trace, warn};

use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

/// CPU (MIPS R3000A) emulation implementation
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Clock frequency: 33.8688 MHz
/// - Registers: 32 general-purpose registers + HI/LO + COP0
/// - One branch delay slot and one load delay slot
///
/// # Example
/// ```
/// use xsp::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// assert_eq!(cpu.pc(), 0xBFC0_0000);
/// ```
#[derive(Debug, Clone)]
pub struct CPU {
    /// General purpose registers (r0-r31)
    ///
    /// r0 is hardwired to always return 0
    regs: [u32; 32],

    /// Address of the next instruction to fetch
    pc: u32,

    /// Address fetched after `pc`; a branch rewrites it
    next_pc: u32,

    /// HI register (multiplication/division result upper 32 bits)
    hi: u32,

    /// LO register (multiplication/division result lower 32 bits)
    lo: u32,

    /// Coprocessor 0 (System Control Unit)
    cop0: COP0,

    /// Load issued by the previous instruction, not yet visible
    load_delay: Option<LoadDelay>,

    /// Load issued by the instruction currently executing
    next_load: Option<LoadDelay>,

    /// Last register written directly by the current instruction
    written: Option<u8>,

    /// The current instruction is a branch or jump
    branch: bool,

    /// The current instruction sits in a branch delay slot
    delay_slot: bool,

    /// Address of the instruction currently executing
    current_pc: u32,

    /// Current instruction word
    current_instruction: u32,

    /// Retired instruction count
    cycles: u64,

    /// Last exception code taken
    fault_cause: u32,

    /// Address of the instruction that raised the last exception
    fault_pc: u32,
}

/// Pending load
///
/// The MIPS R3000A has a load delay slot: the result of a load instruction
/// is not visible to the instruction that immediately follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadDelay {
    /// Target register
    pub reg: u8,
    /// Value to load
    pub value: u32,
    /// Primary opcode of the load that produced it
    pub op: u32,
}

/// Flat copy of the architectural CPU state
///
/// This is what crosses the shared-state boundary: the general registers,
/// the COP0 bank, HI/LO, the pending load and the PC pair expressed as
/// `pc` plus the delta to the following fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuRegisters {
    pub regs: [u32; 32],
    pub cop0: [u32; 32],
    pub lo: u32,
    pub hi: u32,
    /// Value of the pending load (0 when none)
    pub load_value: u32,
    /// Destination of the pending load
    pub load_reg: u32,
    /// Opcode of the pending load, 0 when none is pending
    pub load_op: u32,
    pub pc: u32,
    /// `next_pc - pc`; anything other than 4 means a branch is in flight
    pub pc_diff: u32,
    pub fault_cause: u32,
    pub fault_pc: u32,
}

// Module declarations
mod cop0;
mod decode;
mod disassembler;
mod instructions;
#[cfg(test)]
mod tests;
mod tracer;

// Re-exports
pub use cop0::ExceptionCause;
use cop0::COP0;
pub use decode::Instruction;
pub use disassembler::Disassembler;
pub use tracer::CpuTracer;

impl CPU {
    /// Reset vector
    pub const RESET_VECTOR: u32 = 0xBFC0_0000;

    /// Create a new CPU instance with initial state
    ///
    /// The CPU is initialized with the following state:
    /// - All general purpose registers: 0
    /// - PC: 0xBFC00000 (BIOS entry point)
    /// - COP0 SR: 0x10900000
    /// - COP0 PRID: 0x00000002
    ///
    /// # Example
    /// ```
    /// use xsp::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0);
    /// assert_eq!(cpu.cop0_reg(12), 0x1090_0000);
    /// ```
    pub fn new() -> Self {
        Self {
            regs: [0u32; 32],
            pc: Self::RESET_VECTOR,
            next_pc: Self::RESET_VECTOR.wrapping_add(4),
            hi: 0,
            lo: 0,
            cop0: COP0::new(),
            load_delay: None,
            next_load: None,
            written: None,
            branch: false,
            delay_slot: false,
            current_pc: Self::RESET_VECTOR,
            current_instruction: 0,
            cycles: 0,
            fault_cause: 0,
            fault_pc: 0,
        }
    }

    /// Reset CPU to initial state
    ///
    /// This mimics the behavior of power-on or hardware reset.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read from general purpose register
    ///
    /// r0 is hardwired to always return 0.
    ///
    /// # Example
    /// ```
    /// use xsp::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        if index == 0 {
            0
        } else {
            self.regs[(index & 0x1F) as usize]
        }
    }

    /// Write to general purpose register
    ///
    /// Writes to r0 are ignored. A direct write to the register a pending
    /// load targets cancels that load.
    ///
    /// # Example
    /// ```
    /// use xsp::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x12345678);
    /// assert_eq!(cpu.reg(1), 0x12345678);
    ///
    /// cpu.set_reg(0, 0xDEADBEEF);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        let index = index & 0x1F;
        if index != 0 {
            self.regs[index as usize] = value;
            self.written = Some(index);
        }
    }

    /// Queue a load result for the register file
    ///
    /// The value becomes visible once the following instruction has
    /// executed. Loads into r0 are dropped.
    pub(crate) fn set_reg_delayed(&mut self, index: u8, value: u32, op: u32) {
        let index = index & 0x1F;
        self.next_load = if index != 0 {
            Some(LoadDelay {
                reg: index,
                value,
                op,
            })
        } else {
            None
        };
    }

    /// Current value of `index` as a load-merging instruction sees it
    ///
    /// LWL/LWR merge into the value still in flight when the previous load
    /// targeted the same register.
    pub(crate) fn reg_for_merge(&self, index: u8) -> u32 {
        match self.load_delay {
            Some(delay) if delay.reg == index => delay.value,
            _ => self.reg(index),
        }
    }

    /// Execute one instruction
    ///
    /// 1. Mirror the interrupt line into CAUSE and take a pending interrupt
    /// 2. Fetch the word at PC (address and bus errors become exceptions)
    /// 3. Advance the PC pair and execute
    /// 4. Retire the previous load unless this instruction overwrote its
    ///    destination, then promote this instruction's load
    ///
    /// Bus errors raised while executing are converted into CPU exceptions
    /// here, so the returned error only carries host-level failures.
    ///
    /// # Returns
    ///
    /// Number of cycles consumed (always 1)
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::cpu::CPU;
    /// use xsp::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // The blank BIOS decodes as NOPs
    /// let cycles = cpu.step(&mut bus).unwrap();
    /// assert_eq!(cycles, 1);
    /// assert_eq!(cpu.pc(), 0xBFC0_0004);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        self.current_pc = self.pc;
        self.delay_slot = self.branch;
        self.branch = false;
        self.written = None;
        self.next_load = None;

        self.cop0.set_interrupt_line(bus.irq_pending());
        if self.cop0.interrupt_pending() {
            self.retire_loads();
            self.exception(ExceptionCause::Interrupt);
            self.cycles += 1;
            return Ok(1);
        }

        let pc = self.pc;
        if pc & 3 != 0 {
            self.cop0.set_bad_vaddr(pc);
            self.exception(ExceptionCause::AddressErrorLoad);
            self.retire_loads();
            self.cycles += 1;
            return Ok(1);
        }

        self.current_instruction = match bus.read32(pc) {
            Ok(word) => word,
            Err(EmulatorError::InvalidMemoryAccess { .. }) => {
                self.exception(ExceptionCause::BusErrorInstruction);
                self.retire_loads();
                self.cycles += 1;
                return Ok(1);
            }
            Err(e) => return Err(e),
        };

        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        match self.execute_instruction(bus) {
            Ok(()) => {}
            Err(EmulatorError::InvalidMemoryAccess { address }) => {
                debug!("CPU: bus error at 0x{:08X}", address);
                self.exception(ExceptionCause::BusErrorData);
            }
            Err(EmulatorError::UnalignedAccess { address, .. }) => {
                self.cop0.set_bad_vaddr(address);
                let cause = if Instruction(self.current_instruction).op() >= 0x28 {
                    ExceptionCause::AddressErrorStore
                } else {
                    ExceptionCause::AddressErrorLoad
                };
                self.exception(cause);
            }
            Err(e) => return Err(e),
        }

        self.retire_loads();
        self.cycles += 1;
        Ok(1)
    }

    /// Commit the previous load and promote the current one
    fn retire_loads(&mut self) {
        if let Some(delay) = self.load_delay.take() {
            let overwritten = self.written == Some(delay.reg)
                || self.next_load.is_some_and(|next| next.reg == delay.reg);
            if !overwritten {
                self.regs[delay.reg as usize] = delay.value;
            }
        }
        self.load_delay = self.next_load.take();
    }

    /// Enter an exception from the current instruction
    ///
    /// EPC is the faulting instruction, or the branch before it when the
    /// instruction sits in a delay slot. Any load the faulting instruction
    /// issued is discarded.
    pub(crate) fn exception(&mut self, cause: ExceptionCause) {
        self.enter_exception(cause, 0);
    }

    /// Raise CoprocessorUnusable for coprocessor `n`
    pub(crate) fn coprocessor_unusable(&mut self, n: u32) {
        self.enter_exception(ExceptionCause::CoprocessorUnusable, n);
    }

    fn enter_exception(&mut self, cause: ExceptionCause, coprocessor: u32) {
        let epc = if self.delay_slot {
            self.current_pc.wrapping_sub(4)
        } else {
            self.current_pc
        };
        let handler = self
            .cop0
            .enter_exception(cause, epc, self.delay_slot, coprocessor);

        if cause.is_routine() {
            debug!(
                "CPU: {:?} at 0x{:08X} (EPC=0x{:08X}) -> 0x{:08X}",
                cause, self.current_pc, epc, handler
            );
        } else {
            warn!(
                "CPU: {:?} at 0x{:08X} (EPC=0x{:08X}, instruction=0x{:08X}, delay={}) -> 0x{:08X}",
                cause, self.current_pc, epc, self.current_instruction, self.delay_slot, handler
            );
        }

        self.fault_cause = cause as u32;
        self.fault_pc = self.current_pc;
        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
        self.branch = false;
        self.next_load = None;
    }

    /// Mark the current instruction as a branch and set the target
    ///
    /// `taken == false` still marks the branch: the next instruction is a
    /// delay slot either way.
    pub(crate) fn branch_to(&mut self, target: u32, taken: bool) {
        self.branch = true;
        if taken {
            trace!("CPU: branch 0x{:08X} -> 0x{:08X}", self.current_pc, target);
            self.next_pc = target;
        }
    }

    /// Check if the instruction at PC will execute in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.branch
    }

    /// Get current PC value
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Address fetched after the instruction at PC
    pub fn next_pc(&self) -> u32 {
        self.next_pc
    }

    /// Redirect execution to `pc`, dropping any branch in flight
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
        self.next_pc = pc.wrapping_add(4);
        self.branch = false;
    }

    /// Address of the most recently executed instruction
    pub fn current_pc(&self) -> u32 {
        self.current_pc
    }

    /// Most recently executed instruction word
    pub fn current_instruction(&self) -> u32 {
        self.current_instruction
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Read a COP0 register
    pub fn cop0_reg(&self, index: u8) -> u32 {
        self.cop0.read(index)
    }

    /// Write a COP0 register with MTC0 semantics
    pub fn set_cop0_reg(&mut self, index: u8, value: u32) {
        self.cop0.write(index, value);
    }

    /// Load still in flight, if any
    pub fn pending_load(&self) -> Option<LoadDelay> {
        self.load_delay
    }

    /// Retired instruction count
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Last exception code and the address that raised it
    pub fn last_fault(&self) -> (u32, u32) {
        (self.fault_cause, self.fault_pc)
    }

    /// Snapshot the architectural state
    pub fn registers(&self) -> CpuRegisters {
        let (load_value, load_reg, load_op) = match self.load_delay {
            Some(delay) => (delay.value, delay.reg as u32, delay.op),
            None => (0, 0, 0),
        };
        CpuRegisters {
            regs: self.regs,
            cop0: self.cop0.regs,
            lo: self.lo,
            hi: self.hi,
            load_value,
            load_reg,
            load_op,
            pc: self.pc,
            pc_diff: self.next_pc.wrapping_sub(self.pc),
            fault_cause: self.fault_cause,
            fault_pc: self.fault_pc,
        }
    }

    /// Restore the architectural state written by [`CPU::registers`]
    ///
    /// A `pc_diff` other than 4 is taken to mean the instruction at PC is a
    /// delay slot.
    pub fn restore(&mut self, state: &CpuRegisters) {
        self.regs = state.regs;
        self.regs[0] = 0;
        self.cop0.regs = state.cop0;
        self.lo = state.lo;
        self.hi = state.hi;
        self.load_delay = if state.load_op != 0 && state.load_reg & 0x1F != 0 {
            Some(LoadDelay {
                reg: (state.load_reg & 0x1F) as u8,
                value: state.load_value,
                op: state.load_op,
            })
        } else {
            None
        };
        self.next_load = None;
        self.pc = state.pc;
        self.next_pc = state.pc.wrapping_add(state.pc_diff);
        self.branch = state.pc_diff != 4;
        self.fault_cause = state.fault_cause;
        self.fault_pc = state.fault_pc;
    }

    /// Format all CPU registers for debugging
    ///
    /// # Example
    ///
    /// ```
    /// use xsp::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// let dump = cpu.register_dump();
    /// assert!(dump.contains("PC: 0xBFC00000"));
    /// ```
    pub fn register_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "PC: 0x{:08X}  Next PC: 0x{:08X}", self.pc, self.next_pc);
        let _ = writeln!(out, "HI: 0x{:08X}  LO: 0x{:08X}", self.hi, self.lo);
        for row in 0..8u8 {
            for col in 0..4u8 {
                let i = row * 4 + col;
                let _ = write!(out, "r{:<2}: 0x{:08X}  ", i, self.reg(i));
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "SR: 0x{:08X}  CAUSE: 0x{:08X}  EPC: 0x{:08X}  BADA: 0x{:08X}",
            self.cop0.regs[COP0::SR],
            self.cop0.regs[COP0::CAUSE],
            self.cop0.regs[COP0::EPC],
            self.cop0.regs[COP0::BADA]
        );
        out
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
