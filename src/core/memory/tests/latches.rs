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

use super::*;

#[test]
fn test_register_latch_storage() {
    let mut latch = RegisterLatch::new(0x1F80_1000, 0x1F80_10FF);
    assert_eq!(latch.address_range(), (0x1F80_1000, 0x1F80_10FF));

    latch.write_register(0x08, 0x1234_5678).unwrap();
    latch.write_register8(0x09, 0xAB).unwrap();
    assert_eq!(latch.read_register(0x08).unwrap(), 0x1234_AB78);

    // Outside the window reads zero and ignores writes
    latch.write_register(0x400, 1).unwrap();
    assert_eq!(latch.read_register(0x400).unwrap(), 0);

    latch.reset();
    assert_eq!(latch.read_register(0x08).unwrap(), 0);
}

#[test]
fn test_spu_transfer_pointer() {
    let mut spu = SpuPort::new();

    spu.write_register16(0x1A6, 0x1000).unwrap();
    assert_eq!(spu.write_ptr(), 0x8000);
    assert_eq!(spu.read_register16(0x1A6).unwrap(), 0x1000);

    spu.write_register16(0x1A8, 0xABCD).unwrap();
    spu.write_register16(0x1A8, 0x1234).unwrap();
    assert_eq!(spu.write_ptr(), 0x8004);
}

#[test]
fn test_spu_transfer_pointer_wraps() {
    let mut spu = SpuPort::new();

    spu.write_register16(0x1A6, 0xFFFF).unwrap();
    assert_eq!(spu.write_ptr(), 0x7FFF8);
    for _ in 0..4 {
        spu.write_register16(0x1A8, 0).unwrap();
    }
    assert_eq!(spu.write_ptr(), 0);
}

#[test]
fn test_spu_status_is_read_only() {
    let mut spu = SpuPort::new();

    spu.write_register16(0x1AE, 0xFFFF).unwrap();
    assert_eq!(spu.read_register16(0x1AE).unwrap(), 0);

    spu.write_register8(0x1AA, 0x3F).unwrap();
    assert_eq!(spu.read_register16(0x1AE).unwrap(), 0x3F);
}

#[test]
fn test_spu_word_access_splits_halves() {
    let mut spu = SpuPort::new();

    // Main volume left/right
    spu.write_register(0x180, 0x2000_3FFF).unwrap();
    assert_eq!(spu.read_register16(0x180).unwrap(), 0x3FFF);
    assert_eq!(spu.read_register16(0x182).unwrap(), 0x2000);
    assert_eq!(spu.read_register(0x180).unwrap(), 0x2000_3FFF);
}

#[test]
fn test_spu_restore() {
    let mut spu = SpuPort::new();
    spu.restore(0x1234);
    assert_eq!(spu.write_ptr(), 0x1234);
    spu.reset();
    assert_eq!(spu.write_ptr(), 0);
}
