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

//! GP0 line commands (0x40-0x5F)
//!
//! Single lines carry two vertices. Polylines keep accepting vertices after
//! the first segment until a terminator word matching `0x5xxx5xxx`.
//!
//! ```text
//! Flat:    CCBBGGRR  Y0X0  Y1X1  [Y2X2 ...]  [5xxx5xxx]
//! Shaded:  CCBBGGRR  Y0X0  C1  Y1X1  [C2  Y2X2 ...]  [5xxx5xxx]
//! ```

use super::super::packet::LineFlags;
use super::super::primitives::{Color, Vertex};
use super::super::render::ShadedVertex;
use super::super::GPU;

/// Polyline terminator pattern
const TERMINATOR_MASK: u32 = 0xF000_F000;
const TERMINATOR: u32 = 0x5000_5000;

/// State of a polyline still receiving vertices
#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::core::gpu) struct PolyLine {
    flags: LineFlags,
    /// End point of the last drawn segment
    last: ShadedVertex,
    /// Color word received for the next vertex (shaded polylines)
    next_color: Option<Color>,
}

impl GPU {
    /// Decode and draw the first segment of a line packet
    pub(in crate::core::gpu) fn gp0_line(&mut self, flags: LineFlags, words: &[u32]) {
        let start_color = Color::from_u32(words[0]);
        let start = self.line_vertex(words[1], start_color);
        let end = if flags.shaded {
            self.line_vertex(words[3], Color::from_u32(words[2]))
        } else {
            self.line_vertex(words[2], start_color)
        };

        self.draw_segment(flags, start, end);

        if flags.polyline {
            self.polyline = Some(PolyLine {
                flags,
                last: end,
                next_color: None,
            });
        }
    }

    /// Feed one word to the active polyline
    pub(in crate::core::gpu) fn process_polyline_word(&mut self, word: u32) {
        let Some(mut state) = self.polyline.take() else {
            return;
        };

        if word & TERMINATOR_MASK == TERMINATOR {
            log::trace!("Polyline terminated");
            return;
        }

        if state.flags.shaded && state.next_color.is_none() {
            state.next_color = Some(Color::from_u32(word));
            self.polyline = Some(state);
            return;
        }

        let color = state.next_color.take().unwrap_or(state.last.color);
        let next = self.line_vertex(word, color);
        self.draw_segment(state.flags, state.last, next);
        state.last = next;
        self.polyline = Some(state);
    }

    fn line_vertex(&self, word: u32, color: Color) -> ShadedVertex {
        let position = Vertex::from_u32(word).offset(self.draw_offset.0, self.draw_offset.1);
        ShadedVertex {
            x: position.x as i32,
            y: position.y as i32,
            color,
            ..Default::default()
        }
    }

    fn draw_segment(&mut self, flags: LineFlags, start: ShadedVertex, end: ShadedVertex) {
        let blend = if flags.semi_transparent {
            Some(self.draw_mode.blending())
        } else {
            None
        };
        log::trace!(
            "GP0 line ({}, {}) -> ({}, {})",
            start.x,
            start.y,
            end.x,
            end.y
        );
        self.rasterizer.draw_line(&mut self.vram, start, end, blend);
    }
}
