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

#[test]
fn test_cpu_initialization() {
    let cpu = CPU::new();
    assert_eq!(cpu.pc(), 0xBFC0_0000);
    assert_eq!(cpu.next_pc(), 0xBFC0_0004);
    assert_eq!(cpu.cop0_reg(12), 0x1090_0000);
    assert_eq!(cpu.cop0_reg(15), 0x0000_0002);
    assert_eq!(cpu.cycles(), 0);
    assert!(cpu.pending_load().is_none());
    for i in 0..32 {
        assert_eq!(cpu.reg(i), 0);
    }
}

#[test]
fn test_r0_is_hardwired() {
    let (mut cpu, mut bus) = setup(&[addiu(0, 0, 5), addu(1, 0, 0)]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.reg(1), 0);
}

#[test]
fn test_reset_restores_power_on_state() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, 5), syscall()]);
    run(&mut cpu, &mut bus, 2);
    assert_ne!(cpu.pc(), 0xBFC0_0000);

    cpu.reset();
    assert_eq!(cpu.pc(), 0xBFC0_0000);
    assert_eq!(cpu.reg(1), 0);
    assert_eq!(cpu.cop0_reg(12), 0x1090_0000);
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn test_sequential_execution_and_cycles() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, 1), addiu(2, 1, 1), addiu(3, 2, 1)]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(3), 3);
    assert_eq!(cpu.pc(), CODE + 12);
    assert_eq!(cpu.cycles(), 3);
    assert_eq!(cpu.current_pc(), CODE + 8);
}

#[test]
fn test_lui_ori_constant() {
    let (mut cpu, mut bus) = setup(&[lui(1, 0x1F80), ori(1, 1, 0x1070)]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(1), 0x1F80_1070);
}

#[test]
fn test_boot_from_blank_bios() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.pc(), 0xBFC0_0010);
}

#[test]
fn test_register_dump_lists_state() {
    let mut cpu = CPU::new();
    cpu.set_reg(31, 0xCAFE_BABE);
    let dump = cpu.register_dump();
    assert!(dump.contains("PC: 0xBFC00000"));
    assert!(dump.contains("r31: 0xCAFEBABE"));
    assert!(dump.contains("SR: 0x10900000"));
}

#[test]
fn test_registers_round_trip_with_branch_and_load_in_flight() {
    let (mut cpu, mut bus) = setup(&[
        lw(2, 0, 1),
        beq(0, 0, 4),
        nop(),
    ]);
    bus.write32(DATA, 0x1234_5678).unwrap();
    cpu.set_reg(1, DATA);
    cpu.step(&mut bus).unwrap();

    let after_load = cpu.registers();
    assert_eq!(after_load.load_reg, 2);
    assert_eq!(after_load.load_value, 0x1234_5678);
    assert_eq!(after_load.load_op, 0x23);
    assert_eq!(after_load.pc_diff, 4);

    cpu.step(&mut bus).unwrap();
    let state = cpu.registers();
    assert_eq!(state.pc, CODE + 8);
    assert_eq!(state.pc_diff, 16);

    let mut copy = CPU::new();
    copy.restore(&state);
    assert_eq!(copy.registers(), state);
    assert!(copy.in_delay_slot());
    assert_eq!(copy.reg(2), 0x1234_5678);

    // Both continue identically into the branch target
    let mut bus2 = bus.clone();
    cpu.step(&mut bus).unwrap();
    copy.step(&mut bus2).unwrap();
    assert_eq!(cpu.pc(), CODE + 24);
    assert_eq!(copy.pc(), cpu.pc());
}

#[test]
fn test_restore_pending_load_commits_after_next_step() {
    let (mut cpu, mut bus) = setup(&[lw(2, 0, 1), addu(3, 2, 0), nop()]);
    bus.write32(DATA, 77).unwrap();
    cpu.set_reg(1, DATA);
    cpu.step(&mut bus).unwrap();

    let mut copy = CPU::new();
    copy.restore(&cpu.registers());
    assert_eq!(copy.reg(2), 0);
    copy.step(&mut bus).unwrap();
    assert_eq!(copy.reg(3), 0);
    assert_eq!(copy.reg(2), 77);
}
