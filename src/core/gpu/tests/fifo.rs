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

//! Command FIFO tests

use super::*;

#[test]
fn test_ring_cursors() {
    let mut fifo = CommandFifo::new();
    assert!(fifo.is_empty());

    for i in 0..15 {
        assert!(fifo.push(i));
    }
    assert!(fifo.is_full());
    assert!(!fifo.push(99));
    assert_eq!(fifo.len(), 15);
    assert_eq!(fifo.beg(), 0);
    assert_eq!(fifo.end(), 15);

    assert_eq!(fifo.pop(), Some(0));
    assert!(fifo.push(15));
    assert_eq!(fifo.end(), 0, "end cursor wraps");
    assert_eq!(fifo.peek(14), Some(15));
}

#[test]
fn test_pop_into() {
    let mut fifo = CommandFifo::new();
    fifo.push(1);
    fifo.push(2);
    fifo.push(3);

    let mut out = [0u32; 4];
    assert_eq!(fifo.pop_into(2, &mut out), &[1, 2]);
    assert_eq!(fifo.len(), 1);
    assert_eq!(fifo.pop_into(5, &mut out), &[3]);
    assert!(fifo.is_empty());
}

#[test]
fn test_packet_waits_for_all_words() {
    let mut gpu = GPU::new();

    gpu.write_gp0(0xA000_0000);
    assert_eq!(gpu.fifo().len(), 1);
    assert_eq!(gpu.status() & (1 << 26), 0, "busy while a packet is partial");

    gpu.write_gp0(0x0000_0000);
    assert_eq!(gpu.fifo().len(), 2);
    assert!(gpu.vram_transfer.is_none());

    gpu.write_gp0(0x0001_0001);
    assert!(gpu.fifo().is_empty());
    assert!(gpu.vram_transfer.is_some());
}

#[test]
fn test_unknown_opcode_drops_one_word() {
    let mut gpu = GPU::new();

    gpu.write_gp0(0xFF00_0000);
    assert!(gpu.fifo().is_empty());

    // The stream resynchronizes on the next word
    gpu.write_gp0(0xE500_0003);
    assert_eq!(gpu.draw_offset(), (3, 0));
}

#[test]
fn test_packet_lengths() {
    let len = |word| Packet::decode(word).map(|p| p.word_count()).unwrap();

    assert_eq!(len(0x0000_0000), 1);
    assert_eq!(len(0x0200_0000), 3);
    assert_eq!(len(0x2000_0000), 4); // flat triangle
    assert_eq!(len(0x2800_0000), 5); // flat quad
    assert_eq!(len(0x2C00_0000), 9); // textured quad
    assert_eq!(len(0x3000_0000), 6); // shaded triangle
    assert_eq!(len(0x3800_0000), 8); // shaded quad
    assert_eq!(len(0x3400_0000), 9); // shaded textured triangle
    assert_eq!(len(0x4000_0000), 3); // line
    assert_eq!(len(0x5000_0000), 4); // shaded line
    assert_eq!(len(0x6000_0000), 3); // variable rectangle
    assert_eq!(len(0x6400_0000), 4); // textured variable rectangle
    assert_eq!(len(0x7C00_0000), 3); // textured 16×16
    assert_eq!(len(0x8000_0000), 4);
    assert_eq!(len(0xA000_0000), 3);
    assert_eq!(len(0xE600_0000), 1);
}

#[test]
fn test_invalid_opcodes() {
    for opcode in [0xE0u32, 0xE7, 0xEF, 0xF0, 0xFF] {
        assert!(matches!(
            Packet::decode(opcode << 24),
            Err(GpuError::InvalidGp0Command { .. })
        ));
    }
}

#[test]
fn test_gp1_reset_command_buffer_clears_fifo() {
    let mut gpu = GPU::new();
    gpu.write_gp0(0x2000_0000);
    gpu.write_gp0(0);
    assert_eq!(gpu.fifo().len(), 2);

    gpu.write_gp1(0x0100_0000);
    assert!(gpu.fifo().is_empty());
}
