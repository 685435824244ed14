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

use super::asm::*;
use super::*;
use crate::core::interrupt::interrupts;

const SR_BEV_IEC_IM2: u32 = 0x1040_0401;

#[test]
fn test_syscall_entry() {
    let (mut cpu, mut bus) = setup(&[syscall()]);
    cpu.set_cop0_reg(12, 0x1040_0001);
    cpu.step(&mut bus).unwrap();

    assert_eq!(exc_code(&cpu), 8);
    assert_eq!(cpu.cop0_reg(14), CODE);
    assert_eq!(cpu.cop0_reg(13) & (1 << 31), 0);
    assert_eq!(cpu.pc(), 0xBFC0_0180);
    // mode stack pushed: IEc moved to IEp
    assert_eq!(cpu.cop0_reg(12) & 0x3F, 0b000100);
    assert_eq!(cpu.last_fault(), (8, CODE));
}

#[test]
fn test_vector_without_bev() {
    let (mut cpu, mut bus) = setup(&[syscall()]);
    cpu.set_cop0_reg(12, 0x1000_0000);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc(), 0x8000_0080);
}

#[test]
fn test_break() {
    let (mut cpu, mut bus) = setup(&[0x0000_000D]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 9);
}

#[test]
fn test_overflow_leaves_destination() {
    let (mut cpu, mut bus) = setup(&[add(3, 1, 2)]);
    cpu.set_reg(1, 0x7FFF_FFFF);
    cpu.set_reg(2, 1);
    cpu.set_reg(3, 0x55);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 12);
    assert_eq!(cpu.reg(3), 0x55);

    let (mut cpu, mut bus) = setup(&[addi(2, 1, 1)]);
    cpu.set_reg(1, 0x7FFF_FFFF);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 12);
    assert_eq!(cpu.reg(2), 0);

    // the unsigned form never traps
    let (mut cpu, mut bus) = setup(&[addu(3, 1, 2)]);
    cpu.set_reg(1, 0x7FFF_FFFF);
    cpu.set_reg(2, 1);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(3), 0x8000_0000);
    assert_eq!(cpu.pc(), CODE + 4);
}

#[test]
fn test_misaligned_data_access() {
    let (mut cpu, mut bus) = setup(&[lw(2, 2, 1)]);
    cpu.set_reg(1, DATA);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 4);
    assert_eq!(cpu.cop0_reg(8), DATA + 2);

    let (mut cpu, mut bus) = setup(&[i_type(0x29, 1, 2, 1)]); // sh r2, 1(r1)
    cpu.set_reg(1, DATA);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 5);
    assert_eq!(cpu.cop0_reg(8), DATA + 1);
}

#[test]
fn test_unmapped_data_access_is_bus_error() {
    let (mut cpu, mut bus) = setup(&[lui(1, 0xBF60), lw(2, 0, 1)]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(exc_code(&cpu), 7);
    assert_eq!(cpu.cop0_reg(14), CODE + 4);

    let (mut cpu, mut bus) = setup(&[lui(1, 0xBF60), sw(2, 0, 1)]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(exc_code(&cpu), 7);
}

#[test]
fn test_kseg2_data_access_is_bus_error() {
    let (mut cpu, mut bus) = setup(&[lui(1, 0xC000), lw(2, 0, 1)]);
    bus.write32(0x8000_0000, 0xDEAD_BEEF).unwrap();
    run(&mut cpu, &mut bus, 2);
    assert_eq!(exc_code(&cpu), 7);
    assert_eq!(cpu.last_fault(), (7, CODE + 4));
    assert_ne!(cpu.reg(2), 0xDEAD_BEEF);
}

#[test]
fn test_fetch_from_unmapped_is_instruction_bus_error() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();
    cpu.set_pc(0xBF60_0000);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 6);
    assert_eq!(cpu.cop0_reg(14), 0xBF60_0000);
    // reset SR leaves BEV clear
    assert_eq!(cpu.pc(), 0x8000_0080);
}

#[test]
fn test_misaligned_pc_is_address_error() {
    let (mut cpu, mut bus) = setup(&[jr(4), nop()]);
    cpu.set_reg(4, CODE + 2);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(exc_code(&cpu), 4);
    assert_eq!(cpu.cop0_reg(8), CODE + 2);
    assert_eq!(cpu.cop0_reg(14), CODE + 2);
}

#[test]
fn test_reserved_instructions() {
    for word in [0xFC00_0000, 0x0000_0001, 0x4200_0001] {
        let (mut cpu, mut bus) = setup(&[word]);
        cpu.step(&mut bus).unwrap();
        assert_eq!(exc_code(&cpu), 10, "word 0x{:08X}", word);
    }
}

#[test]
fn test_coprocessor_unusable() {
    let ce = |cpu: &CPU| (cpu.cop0_reg(13) >> 28) & 3;

    // COP2 with CU2 clear
    let (mut cpu, mut bus) = setup(&[0x4A00_0000]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 11);
    assert_eq!(ce(&cpu), 2);

    // COP2 with CU2 set retires quietly
    let (mut cpu, mut bus) = setup(&[0x4A00_0000, 0xC800_0000, 0xE800_0000]);
    cpu.set_cop0_reg(12, 0x5090_0000);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc(), CODE + 12);
    assert_eq!(exc_code(&cpu), 0);

    // COP1 and LWC3 always fault
    let (mut cpu, mut bus) = setup(&[0x4400_0000]);
    cpu.step(&mut bus).unwrap();
    assert_eq!((exc_code(&cpu), ce(&cpu)), (11, 1));

    let (mut cpu, mut bus) = setup(&[0xCC00_0000]);
    cpu.step(&mut bus).unwrap();
    assert_eq!((exc_code(&cpu), ce(&cpu)), (11, 3));
}

#[test]
fn test_cache_isolation_drops_stores() {
    let (mut cpu, mut bus) = setup(&[sw(2, 0, 1), i_type(0x28, 1, 2, 4)]);
    bus.write32(DATA, 0x1111_1111).unwrap();
    cpu.set_cop0_reg(12, 0x1091_0000);
    cpu.set_reg(1, DATA);
    cpu.set_reg(2, 0xFFFF_FFFF);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.read32(DATA).unwrap(), 0x1111_1111);
    assert_eq!(bus.read32(DATA + 4).unwrap(), 0);
}

#[test]
fn test_hardware_interrupt_taken_before_instruction() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, 1)]);
    cpu.set_cop0_reg(12, SR_BEV_IEC_IM2);
    bus.interrupt_controller_mut().write_mask(interrupts::VBLANK as u32);
    bus.interrupt_controller_mut().request(interrupts::VBLANK);

    cpu.step(&mut bus).unwrap();
    assert_eq!(exc_code(&cpu), 0);
    assert_eq!(cpu.cop0_reg(14), CODE);
    assert_ne!(cpu.cop0_reg(13) & (1 << 10), 0);
    assert_eq!(cpu.reg(1), 0);
    assert_eq!(cpu.pc(), 0xBFC0_0180);
    // interrupts now disabled by the mode push
    assert_eq!(cpu.cop0_reg(12) & 1, 0);
}

#[test]
fn test_interrupt_masked_by_iec() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, 1)]);
    cpu.set_cop0_reg(12, 0x1040_0400);
    bus.interrupt_controller_mut().write_mask(interrupts::VBLANK as u32);
    bus.interrupt_controller_mut().request(interrupts::VBLANK);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(1), 1);
    assert_ne!(cpu.cop0_reg(13) & (1 << 10), 0);
}

#[test]
fn test_interrupt_line_follows_controller() {
    let (mut cpu, mut bus) = setup(&[nop(), nop()]);
    bus.interrupt_controller_mut().write_mask(interrupts::DMA as u32);
    bus.interrupt_controller_mut().request(interrupts::DMA);
    cpu.step(&mut bus).unwrap();
    assert_ne!(cpu.cop0_reg(13) & (1 << 10), 0);

    bus.interrupt_controller_mut().acknowledge(interrupts::DMA);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.cop0_reg(13) & (1 << 10), 0);
}

#[test]
fn test_software_interrupt() {
    let (mut cpu, mut bus) = setup(&[mtc0(1, 13), nop()]);
    cpu.set_cop0_reg(12, 0x1040_0101);
    cpu.set_reg(1, 0x100);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(exc_code(&cpu), 0);
    assert_eq!(cpu.cop0_reg(14), CODE + 4);
}

#[test]
fn test_interrupt_in_delay_slot_reports_branch() {
    let (mut cpu, mut bus) = setup(&[beq(0, 0, 4), nop()]);
    cpu.set_cop0_reg(12, SR_BEV_IEC_IM2);
    cpu.step(&mut bus).unwrap();

    bus.interrupt_controller_mut().write_mask(interrupts::VBLANK as u32);
    bus.interrupt_controller_mut().request(interrupts::VBLANK);
    cpu.step(&mut bus).unwrap();

    assert_eq!(exc_code(&cpu), 0);
    assert_eq!(cpu.cop0_reg(14), CODE);
    assert_ne!(cpu.cop0_reg(13) & (1 << 31), 0);
}
