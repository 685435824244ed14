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

use log::trace;

/// Coprocessor 0 (System Control)
///
/// COP0 owns the status, cause and exception-PC registers. The CPU hands it
/// every exception entry and RFE so the kernel/user mode stack lives in one
/// place.
#[derive(Debug, Clone)]
pub(super) struct COP0 {
    /// COP0 registers (32 registers)
    pub(super) regs: [u32; 32],
}

impl COP0 {
    /// Breakpoint PC
    pub const BPC: usize = 3;
    /// Breakpoint Data Address
    pub const BDA: usize = 5;
    /// Jump destination of the last taken branch
    pub const TAR: usize = 6;
    /// Debug and cache invalidate control
    pub const DCIC: usize = 7;
    /// Bad Virtual Address
    pub const BADA: usize = 8;
    /// Data Address Mask
    pub const BDAM: usize = 9;
    /// PC Mask
    pub const BPCM: usize = 11;
    /// Status Register
    pub const SR: usize = 12;
    /// Cause Register
    pub const CAUSE: usize = 13;
    /// Exception PC
    pub const EPC: usize = 14;
    /// Processor ID
    pub const PRID: usize = 15;

    /// SR value after reset (CU0 set; BEV clear until the BIOS sets it)
    pub const SR_RESET: u32 = 0x1090_0000;
    /// R3000A processor identifier
    pub const PRID_VALUE: u32 = 0x0000_0002;

    /// SR.IEc, current interrupt enable
    pub const SR_IEC: u32 = 1 << 0;
    /// SR.KUc, current mode (1 = user)
    pub const SR_KUC: u32 = 1 << 1;
    /// SR.IsC, cache isolation
    pub const SR_ISC: u32 = 1 << 16;
    /// SR.BEV, boot exception vectors
    pub const SR_BEV: u32 = 1 << 22;

    /// CAUSE bit mirroring the interrupt controller line
    pub const CAUSE_IRQ: u32 = 1 << 10;
    /// Software interrupt bits, the only CAUSE bits MTC0 may change
    pub const CAUSE_SW: u32 = 0x0000_0300;
    /// Pending interrupt bits that can trigger an exception
    pub const CAUSE_IP: u32 = Self::CAUSE_SW | Self::CAUSE_IRQ;
    /// Branch delay flag
    pub const CAUSE_BD: u32 = 1 << 31;

    const CAUSE_EXCCODE: u32 = 0x7C;
    const CAUSE_CE: u32 = 0x3000_0000;

    const VECTOR_BOOT: u32 = 0xBFC0_0180;
    const VECTOR_RAM: u32 = 0x8000_0080;

    /// Create a new COP0 instance with reset values
    pub(super) fn new() -> Self {
        let mut cop0 = Self { regs: [0u32; 32] };
        cop0.reset();
        cop0
    }

    /// Reset COP0 registers to initial state
    pub(super) fn reset(&mut self) {
        self.regs = [0u32; 32];
        self.regs[Self::SR] = Self::SR_RESET;
        self.regs[Self::PRID] = Self::PRID_VALUE;
    }

    #[inline(always)]
    pub(super) fn sr(&self) -> u32 {
        self.regs[Self::SR]
    }

    #[inline(always)]
    pub(super) fn cause(&self) -> u32 {
        self.regs[Self::CAUSE]
    }

    /// Read a register for MFC0
    pub(super) fn read(&self, index: u8) -> u32 {
        self.regs[(index & 0x1F) as usize]
    }

    /// Write a register for MTC0
    ///
    /// CAUSE only accepts the two software interrupt bits, PRID and BADA are
    /// read-only.
    pub(super) fn write(&mut self, index: u8, value: u32) {
        let index = (index & 0x1F) as usize;
        match index {
            Self::CAUSE => {
                let cause = self.regs[Self::CAUSE];
                self.regs[Self::CAUSE] = (cause & !Self::CAUSE_SW) | (value & Self::CAUSE_SW);
            }
            Self::PRID | Self::BADA => {
                trace!("COP0: ignoring write to read-only r{} (0x{:08X})", index, value);
            }
            _ => self.regs[index] = value,
        }
    }

    /// Mirror the interrupt controller line into CAUSE bit 10
    pub(super) fn set_interrupt_line(&mut self, active: bool) {
        if active {
            self.regs[Self::CAUSE] |= Self::CAUSE_IRQ;
        } else {
            self.regs[Self::CAUSE] &= !Self::CAUSE_IRQ;
        }
    }

    /// True when an interrupt exception should be taken now
    pub(super) fn interrupt_pending(&self) -> bool {
        let sr = self.sr();
        sr & Self::SR_IEC != 0 && (sr & self.cause() & Self::CAUSE_IP) != 0
    }

    pub(super) fn cache_isolated(&self) -> bool {
        self.sr() & Self::SR_ISC != 0
    }

    pub(super) fn user_mode(&self) -> bool {
        self.sr() & Self::SR_KUC != 0
    }

    /// CUn bit for coprocessor `n` (SR bits 28-31)
    pub(super) fn coprocessor_enabled(&self, n: u32) -> bool {
        self.sr() & (1 << (28 + (n & 3))) != 0
    }

    /// Enter an exception and return the handler address
    ///
    /// Pushes the KU/IE mode stack, records the cause code, the faulting
    /// coprocessor number and the branch-delay flag, and latches EPC.
    pub(super) fn enter_exception(
        &mut self,
        cause: ExceptionCause,
        epc: u32,
        branch_delay: bool,
        coprocessor: u32,
    ) -> u32 {
        let sr = self.sr();
        self.regs[Self::SR] = (sr & !0x3F) | ((sr << 2) & 0x3F);

        let mut reg = self.cause() & !(Self::CAUSE_BD | Self::CAUSE_CE | Self::CAUSE_EXCCODE);
        reg |= (cause as u32) << 2;
        reg |= (coprocessor & 3) << 28;
        if branch_delay {
            reg |= Self::CAUSE_BD;
        }
        self.regs[Self::CAUSE] = reg;
        self.regs[Self::EPC] = epc;

        if sr & Self::SR_BEV != 0 {
            Self::VECTOR_BOOT
        } else {
            Self::VECTOR_RAM
        }
    }

    /// RFE: pop the mode stack (bits 5:2 shift into 3:0, bits 5:4 keep)
    pub(super) fn return_from_exception(&mut self) {
        let sr = self.sr();
        self.regs[Self::SR] = (sr & !0x0F) | ((sr >> 2) & 0x0F);
    }

    pub(super) fn set_bad_vaddr(&mut self, address: u32) {
        self.regs[Self::BADA] = address;
    }
}

/// Exception cause codes for MIPS R3000A
///
/// These correspond to the exception codes stored in the CAUSE register
/// when a CPU exception occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExceptionCause {
    /// Interrupt (external or software)
    Interrupt = 0,
    /// Address error on load or instruction fetch
    AddressErrorLoad = 4,
    /// Address error on store
    AddressErrorStore = 5,
    /// Bus error on instruction fetch
    BusErrorInstruction = 6,
    /// Bus error on data access
    BusErrorData = 7,
    /// Syscall instruction executed
    Syscall = 8,
    /// Breakpoint instruction executed
    Breakpoint = 9,
    /// Reserved or illegal instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
}

impl ExceptionCause {
    /// Decode an ExcCode field value
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Interrupt,
            4 => Self::AddressErrorLoad,
            5 => Self::AddressErrorStore,
            6 => Self::BusErrorInstruction,
            7 => Self::BusErrorData,
            8 => Self::Syscall,
            9 => Self::Breakpoint,
            10 => Self::ReservedInstruction,
            11 => Self::CoprocessorUnusable,
            12 => Self::Overflow,
            _ => return None,
        })
    }

    /// Exceptions that are part of normal control flow rather than faults
    pub fn is_routine(self) -> bool {
        matches!(self, Self::Interrupt | Self::Syscall | Self::Breakpoint)
    }
}
