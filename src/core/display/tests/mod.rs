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

//! Display test modules
//!
//! - `framebuffer`: picture scaling, color depth and overlay drawing
//! - `glyph`: atlas loading and glyph addressing


use super::*;

/// Atlas whose glyph 1 has only its top-left pixel set and whose glyph
/// `0xDB` is fully set
pub(super) fn test_atlas() -> GlyphAtlas {
    let mut pixels = vec![0u8; GlyphAtlas::SIZE * GlyphAtlas::SIZE];
    pixels[8] = 0xFF;
    let (gx, gy) = ((0xDB % 16) * 8, (0xDB / 16) * 8);
    for y in 0..8 {
        for x in 0..8 {
            pixels[(gy + y) * GlyphAtlas::SIZE + gx + x] = 1;
        }
    }
    GlyphAtlas::from_pixels(&pixels).unwrap()
}

#[test]
fn test_rgb555_expansion() {
    assert_eq!(rgb555_to_rgba(0x7FFF), [248, 248, 248, 255]);
    assert_eq!(rgb555_to_rgba(0x001F), [248, 0, 0, 255]);
    assert_eq!(rgb555_to_rgba(0x03E0), [0, 248, 0, 255]);
    assert_eq!(rgb555_to_rgba(0x7C00), [0, 0, 248, 255]);
}
