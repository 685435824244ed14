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

//! Debug console overlay
//!
//! A 64x32 character-cell grid that lives beside the GPU framebuffer and
//! collects textual diagnostics: bytes written to the DUART transmit
//! registers and the kernel `putchar` hook both end up here. The presentation
//! layer draws the grid on top of the rendered picture.
//!
//! # Cell Layout
//!
//! Each cell occupies two 32-bit words in the shared state:
//!
//! | Word | Bits  | Meaning                  |
//! |------|-------|--------------------------|
//! | 0    | 0-7   | Glyph index (0 = empty)  |
//! | 1    | 0-15  | Foreground color, RGB555 |
//! | 1    | 16-31 | Background color, RGB555 |
//!
//! # Example
//!
//! ```
//! use xsp::core::console::Console;
//!
//! let mut console = Console::new();
//! console.write_str("OK\n");
//! assert_eq!(console.cell(0, 0).glyph, b'O');
//! assert_eq!(console.cursor(), (0, 1));
//! ```

mod port;

#[cfg(test)]
mod tests;

pub use port::DiagnosticPort;

/// Grid width in cells
pub const COLUMNS: usize = 64;

/// Grid height in cells
pub const ROWS: usize = 32;

/// Shared-state words per cell
pub const CELL_WORDS: usize = 2;

/// Total shared-state words of the grid
pub const GRID_WORDS: usize = COLUMNS * ROWS * CELL_WORDS;

/// One decoded overlay cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    /// Glyph index into the 16x16 atlas
    pub glyph: u8,

    /// Foreground color (RGB555)
    pub fg: u16,

    /// Background color (RGB555, 0 = transparent)
    pub bg: u16,
}

impl Cell {
    /// Pack the attribute word
    #[inline(always)]
    pub fn attribute(&self) -> u32 {
        (self.fg as u32) | ((self.bg as u32) << 16)
    }

    fn from_words(glyph: u32, attribute: u32) -> Self {
        Self {
            glyph: glyph as u8,
            fg: attribute as u16,
            bg: (attribute >> 16) as u16,
        }
    }
}

/// Character-cell terminal backing the overlay
///
/// Behaves like a plain teletype: printable bytes fill cells left to right,
/// `\n` moves to the next row, `\r` returns to column 0, backspace steps the
/// cursor back and `\t` advances to the next multiple of 8. Writing past the
/// last row scrolls the grid up by one.
#[derive(Debug, Clone)]
pub struct Console {
    /// Raw cell words, shared-state order
    words: Vec<u32>,

    /// Cursor column
    col: usize,

    /// Cursor row
    row: usize,

    /// Attribute applied to new characters
    attribute: u32,

    /// Text of the row being written, flushed to the log on newline
    pending_line: String,
}

impl Console {
    /// Default foreground: white
    pub const DEFAULT_FG: u16 = 0x7FFF;

    /// Default background: transparent
    pub const DEFAULT_BG: u16 = 0x0000;

    /// Create an empty console with the cursor at the top-left cell
    pub fn new() -> Self {
        Self {
            words: vec![0; GRID_WORDS],
            col: 0,
            row: 0,
            attribute: Self::DEFAULT_FG as u32 | ((Self::DEFAULT_BG as u32) << 16),
            pending_line: String::new(),
        }
    }

    /// Blank every cell and home the cursor
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.col = 0;
        self.row = 0;
        self.pending_line.clear();
    }

    /// Set the colors used for subsequent characters
    pub fn set_colors(&mut self, fg: u16, bg: u16) {
        self.attribute = fg as u32 | ((bg as u32) << 16);
    }

    /// Cursor position as (column, row)
    pub fn cursor(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    /// Raw grid words in shared-state order
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Decode the cell at `(col, row)`
    ///
    /// Coordinates outside the grid read as an empty cell.
    pub fn cell(&self, col: usize, row: usize) -> Cell {
        if col >= COLUMNS || row >= ROWS {
            return Cell::default();
        }
        let index = Self::index(col, row);
        Cell::from_words(self.words[index], self.words[index + 1])
    }

    /// Overwrite one cell without moving the cursor
    pub fn set_cell(&mut self, col: usize, row: usize, cell: Cell) {
        if col >= COLUMNS || row >= ROWS {
            return;
        }
        let index = Self::index(col, row);
        self.words[index] = cell.glyph as u32;
        self.words[index + 1] = cell.attribute();
    }

    /// Text of one row with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        let text: String = (0..COLUMNS)
            .map(|col| match self.cell(col, row).glyph {
                0 => ' ',
                g => g as char,
            })
            .collect();
        text.trim_end().to_string()
    }

    #[inline(always)]
    fn index(col: usize, row: usize) -> usize {
        (row * COLUMNS + col) * CELL_WORDS
    }

    /// Print every byte of `text`
    pub fn write_str(&mut self, text: &str) {
        for byte in text.bytes() {
            self.put_char(byte);
        }
    }

    /// Feed one byte to the terminal
    pub fn put_char(&mut self, ch: u8) {
        match ch {
            0x00 | 0x07 => {}
            b'\n' => self.newline(),
            b'\r' => self.col = 0,
            0x08 => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = COLUMNS - 1;
                }
                self.pending_line.pop();
            }
            b'\t' => {
                let next = (self.col / 8 + 1) * 8;
                while self.col < next.min(COLUMNS) {
                    self.put_glyph(b' ');
                }
            }
            _ => self.put_glyph(ch),
        }
    }

    fn put_glyph(&mut self, ch: u8) {
        if self.col >= COLUMNS {
            self.wrap();
        }
        let index = Self::index(self.col, self.row);
        self.words[index] = ch as u32;
        self.words[index + 1] = self.attribute;
        self.pending_line.push(ch as char);
        self.col += 1;
    }

    /// Soft wrap at the right edge; the logged line keeps going
    fn wrap(&mut self) {
        self.col = 0;
        self.advance_row();
    }

    fn newline(&mut self) {
        log::info!("console: {}", self.pending_line);
        self.pending_line.clear();
        self.col = 0;
        self.advance_row();
    }

    fn advance_row(&mut self) {
        if self.row + 1 < ROWS {
            self.row += 1;
        } else {
            self.scroll_up();
        }
    }

    /// Move every row up by one and blank the last
    pub fn scroll_up(&mut self) {
        let row_words = COLUMNS * CELL_WORDS;
        self.words.copy_within(row_words.., 0);
        let len = self.words.len();
        self.words[len - row_words..].fill(0);
    }

    /// Load raw grid words (shared-state import)
    ///
    /// The cursor is placed at the start of the row after the last non-empty
    /// one, so new output continues below what was restored.
    pub(crate) fn restore(&mut self, words: &[u32]) {
        let len = words.len().min(GRID_WORDS);
        self.words[..len].copy_from_slice(&words[..len]);
        self.words[len..].fill(0);
        self.pending_line.clear();

        let last_used = (0..ROWS)
            .rev()
            .find(|&row| (0..COLUMNS).any(|col| self.cell(col, row).glyph != 0));
        self.col = 0;
        self.row = match last_used {
            Some(row) if row + 1 < ROWS => row + 1,
            Some(_) => {
                self.scroll_up();
                ROWS - 1
            }
            None => 0,
        };
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
