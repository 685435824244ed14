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

//! GPU (Graphics Processing Unit) implementation
//!
//! The GPU owns 1MB of VRAM (1024×512 16-bit pixels) and is driven through
//! two registers:
//!
//! - **GP0** (0x1F801810 write): drawing and VRAM transfer packets, queued in
//!   a 16-word FIFO and executed as soon as a packet is complete
//! - **GP1** (0x1F801814 write): display control, executed immediately
//! - **GPUREAD** (0x1F801810 read): VRAM→CPU transfer data or a GPU info
//!   response; with neither pending the port reads as GPUSTAT
//! - **GPUSTAT** (0x1F801814 read): status flags
//!
//! # VRAM Layout
//!
//! ```text
//! (0,0) ────────────────────────── (1023,0)
//!   │                                   │
//!   │    1024×512 pixels, 5-5-5 RGB     │
//!   │    plus a mask bit (bit 15)       │
//!   │                                   │
//! (0,511) ──────────────────────── (1023,511)
//! ```
//!
//! # Raster timing
//!
//! The raster line counter advances once per system tick. Reaching the
//! configured line count wraps to zero and reports a vertical blank, which
//! the system forwards to the interrupt controller.

use crate::core::dma::DmaTarget;
use crate::core::error::{GpuError, Result};
use crate::core::memory::IODevice;

mod fifo;
mod gp0;
mod gp1;
mod packet;
mod primitives;
mod registers;
mod render;

#[cfg(test)]
mod tests;

pub use fifo::{CommandFifo, FIFO_SLOTS};
pub use packet::{LineFlags, Packet, PolygonFlags, RectFlags, RectSize};
pub use primitives::{Color, SemiTransparency, TexCoord, TextureDepth, TextureInfo, Vertex};
pub use registers::{
    ColorDepth, DisplayArea, DisplayMode, DisplayRange, DmaDirection, DrawMode, DrawingArea,
    HorizontalRes, TextureWindow, VRAMTransfer, VRAMTransferDirection, VerticalRes, VideoMode,
};
pub use render::{modulate, sample_texel, Rasterizer, ShadedVertex, Texture};

use gp0::PolyLine;

/// GPU state
///
/// # Examples
///
/// ```
/// use xsp::core::GPU;
///
/// let mut gpu = GPU::new();
///
/// // Fill a 16×16 block at (32, 16) with blue
/// gpu.write_gp0(0x02FF_0000);
/// gpu.write_gp0(0x0010_0020);
/// gpu.write_gp0(0x0010_0010);
///
/// assert_eq!(gpu.read_vram(40, 20), 0x7C00);
/// ```
#[derive(Debug, Clone)]
pub struct GPU {
    /// VRAM: 1024×512 pixels, 16-bit per pixel
    vram: Vec<u16>,

    /// Pixel pipeline (clip rectangle and mask settings)
    rasterizer: Rasterizer,

    /// Drawing mode (GP0 E1h)
    draw_mode: DrawMode,

    /// Drawing area (GP0 E3h/E4h)
    draw_area: DrawingArea,

    /// Drawing offset (GP0 E5h)
    draw_offset: (i16, i16),

    /// Texture window (GP0 E2h)
    texture_window: TextureWindow,

    /// Display start and visible size
    display_area: DisplayArea,

    /// Horizontal/vertical display range (GP1 06h/07h)
    display_range: DisplayRange,

    /// Display mode (GP1 08h)
    display_mode: DisplayMode,

    /// Display output disabled (GP1 03h)
    display_disabled: bool,

    /// DMA direction (GP1 04h)
    dma_direction: DmaDirection,

    /// GPUSTAT bit 24, set by GP0 1Fh and cleared by GP1 02h
    interrupt_request: bool,

    /// Rising edge of `interrupt_request` not yet forwarded
    irq_pending: bool,

    /// GP0 command FIFO
    fifo: CommandFifo,

    /// Active VRAM transfer, if any
    vram_transfer: Option<VRAMTransfer>,

    /// Polyline being streamed, if any
    polyline: Option<PolyLine>,

    /// Latched GPUREAD value (GP1 10h responses)
    gpuread: u32,

    /// A GP1(10h) response is waiting to be read through the GP0 port
    gpuread_latched: bool,

    /// Current raster line
    line: u16,

    /// GPUSTAT bit 31
    odd_line: bool,

    /// Lines per frame
    lines_per_frame: u16,

    /// First line of the vertical blanking region
    vblank_start: u16,
}

impl GPU {
    /// VRAM width in pixels
    pub const VRAM_WIDTH: usize = 1024;

    /// VRAM height in pixels
    pub const VRAM_HEIGHT: usize = 512;

    /// Total VRAM size in pixels
    pub const VRAM_SIZE: usize = Self::VRAM_WIDTH * Self::VRAM_HEIGHT;

    /// GP0/GPUREAD register address
    pub const GP0: u32 = 0x1F80_1810;

    /// GP1/GPUSTAT register address
    pub const GP1: u32 = 0x1F80_1814;

    /// Raster lines per frame (NTSC)
    pub const SCANLINES_PER_FRAME: u16 = 263;

    /// First vertical blank line
    pub const VBLANK_START: u16 = 240;

    /// Value returned by GP1(10h) sub-command 7
    const GPU_VERSION: u32 = 2;

    /// Create a GPU with NTSC raster timing
    pub fn new() -> Self {
        Self::with_timing(Self::SCANLINES_PER_FRAME, Self::VBLANK_START)
    }

    /// Create a GPU with custom raster timing
    ///
    /// `lines_per_frame` is clamped to at least 1 and `vblank_start` to at
    /// most `lines_per_frame`.
    pub fn with_timing(lines_per_frame: u16, vblank_start: u16) -> Self {
        let lines_per_frame = lines_per_frame.max(1);
        Self {
            vram: vec![0x0000; Self::VRAM_SIZE],
            rasterizer: Rasterizer::new(),
            draw_mode: DrawMode::default(),
            draw_area: DrawingArea::default(),
            draw_offset: (0, 0),
            texture_window: TextureWindow::default(),
            display_area: DisplayArea::default(),
            display_range: DisplayRange::default(),
            display_mode: DisplayMode::default(),
            display_disabled: true,
            dma_direction: DmaDirection::Off,
            interrupt_request: false,
            irq_pending: false,
            fifo: CommandFifo::new(),
            vram_transfer: None,
            polyline: None,
            gpuread: 0,
            gpuread_latched: false,
            line: 0,
            odd_line: false,
            lines_per_frame,
            vblank_start: vblank_start.min(lines_per_frame),
        }
    }

    /// Reset GPU to initial state, clearing VRAM
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::GPU;
    ///
    /// let mut gpu = GPU::new();
    /// gpu.write_vram(500, 250, 0xFFFF);
    /// gpu.reset();
    /// assert_eq!(gpu.read_vram(500, 250), 0x0000);
    /// ```
    pub fn reset(&mut self) {
        self.reset_state_preserving_vram();
        self.vram.fill(0x0000);
        self.line = 0;
        self.odd_line = false;
    }

    /// Reset registers and queues but keep VRAM contents (GP1 00h)
    fn reset_state_preserving_vram(&mut self) {
        self.rasterizer = Rasterizer::new();
        self.draw_mode = DrawMode::default();
        self.draw_area = DrawingArea::default();
        self.draw_offset = (0, 0);
        self.texture_window = TextureWindow::default();
        self.display_area = DisplayArea::default();
        self.display_range = DisplayRange::default();
        self.display_mode = DisplayMode::default();
        self.display_disabled = true;
        self.dma_direction = DmaDirection::Off;
        self.interrupt_request = false;
        self.irq_pending = false;
        self.fifo.clear();
        self.vram_transfer = None;
        self.polyline = None;
        self.gpuread_latched = false;
    }

    /// Read a 16-bit pixel (coordinates wrap)
    #[inline(always)]
    pub fn read_vram(&self, x: u16, y: u16) -> u16 {
        self.vram[Self::vram_index(x, y)]
    }

    /// Write a 16-bit pixel (coordinates wrap)
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::GPU;
    ///
    /// let mut gpu = GPU::new();
    /// gpu.write_vram(1024 + 100, 100, 0x7FFF);
    /// assert_eq!(gpu.read_vram(100, 100), 0x7FFF);
    /// ```
    #[inline(always)]
    pub fn write_vram(&mut self, x: u16, y: u16, value: u16) {
        self.vram[Self::vram_index(x, y)] = value;
    }

    #[inline(always)]
    fn vram_index(x: u16, y: u16) -> usize {
        ((y & 0x1FF) as usize) * Self::VRAM_WIDTH + (x & 0x3FF) as usize
    }

    /// Whole VRAM as row-major pixels
    pub fn vram(&self) -> &[u16] {
        &self.vram
    }

    /// Mutable VRAM (CPU-visible window and state import)
    pub fn vram_mut(&mut self) -> &mut [u16] {
        &mut self.vram
    }

    /// Keep the rasterizer clip rectangle in sync with the drawing area
    fn update_rasterizer_clip_rect(&mut self) {
        self.rasterizer.set_clip_rect(
            self.draw_area.left as i32,
            self.draw_area.top as i32,
            self.draw_area.right as i32,
            self.draw_area.bottom as i32,
        );
    }

    /// Pack GPUSTAT
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::GPU;
    ///
    /// let gpu = GPU::new();
    /// let status = gpu.status();
    /// assert_ne!(status & (1 << 26), 0); // ready for command
    /// assert_ne!(status & (1 << 28), 0); // ready for DMA block
    /// assert_ne!(status & (1 << 23), 0); // display disabled after reset
    /// ```
    pub fn status(&self) -> u32 {
        let receiving = self.is_receiving_pixels();
        let ready_for_cmd = self.fifo.is_empty() && !receiving && self.polyline.is_none();
        let ready_to_send_vram = matches!(
            self.vram_transfer,
            Some(VRAMTransfer {
                direction: VRAMTransferDirection::VramToCpu,
                ..
            })
        );
        let ready_for_dma = !self.fifo.is_full();
        let dma_request = match self.dma_direction {
            DmaDirection::Off => false,
            DmaDirection::Fifo => !self.fifo.is_full(),
            DmaDirection::CpuToGp0 => ready_for_dma,
            DmaDirection::GpuReadToCpu => ready_to_send_vram,
        };
        let interlace_field = !self.display_mode.interlaced() || self.odd_line;

        let mut status = self.draw_mode.status_bits();
        status |= (self.rasterizer.set_mask() as u32) << 11;
        status |= (self.rasterizer.check_mask() as u32) << 12;
        status |= (interlace_field as u32) << 13;
        status |= self.display_mode.status_bits();
        status |= (self.display_disabled as u32) << 23;
        status |= (self.interrupt_request as u32) << 24;
        status |= (dma_request as u32) << 25;
        status |= (ready_for_cmd as u32) << 26;
        status |= (ready_to_send_vram as u32) << 27;
        status |= (ready_for_dma as u32) << 28;
        status |= (self.dma_direction as u32) << 29;
        status |= ((self.odd_line && !self.in_vblank()) as u32) << 31;
        status
    }

    /// True while GP0 words are routed straight into VRAM
    fn is_receiving_pixels(&self) -> bool {
        matches!(
            self.vram_transfer,
            Some(VRAMTransfer {
                direction: VRAMTransferDirection::CpuToVram,
                ..
            })
        )
    }

    /// Display area (start and visible size)
    pub fn display_area(&self) -> DisplayArea {
        self.display_area
    }

    /// Display mode (GP1 08h)
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Horizontal/vertical display ranges (GP1 06h/07h)
    pub fn display_range(&self) -> DisplayRange {
        self.display_range
    }

    /// Whether the display output is disabled
    pub fn is_display_disabled(&self) -> bool {
        self.display_disabled
    }

    /// Current drawing mode
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Current drawing area
    pub fn draw_area(&self) -> DrawingArea {
        self.draw_area
    }

    /// Current drawing offset
    pub fn draw_offset(&self) -> (i16, i16) {
        self.draw_offset
    }

    /// The GP0 command FIFO
    pub fn fifo(&self) -> &CommandFifo {
        &self.fifo
    }

    /// Current raster line (`gpu_y`)
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Whether the raster is inside the vertical blanking region
    pub fn in_vblank(&self) -> bool {
        self.line >= self.vblank_start
    }

    /// Lines per frame
    pub fn lines_per_frame(&self) -> u16 {
        self.lines_per_frame
    }

    /// Advance the raster by one line
    ///
    /// Returns `true` when the counter wrapped to line 0, i.e. a vertical
    /// blank interrupt must be raised.
    ///
    /// # Examples
    ///
    /// ```
    /// use xsp::core::GPU;
    ///
    /// let mut gpu = GPU::new();
    /// let wraps = (0..GPU::SCANLINES_PER_FRAME).filter(|_| gpu.tick_line()).count();
    /// assert_eq!(wraps, 1);
    /// assert_eq!(gpu.line(), 0);
    /// ```
    pub fn tick_line(&mut self) -> bool {
        self.line += 1;
        let wrapped = self.line >= self.lines_per_frame;
        if wrapped {
            self.line = 0;
            log::trace!("GPU raster wrapped, vblank");
        }
        self.odd_line = if self.in_vblank() {
            false
        } else {
            !self.odd_line
        };
        wrapped
    }

    /// Take the pending GP0(1Fh) interrupt request, if any
    pub fn take_irq(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }

    /// Process a GP0 word
    ///
    /// Words are routed to an active CPU→VRAM transfer or polyline first;
    /// otherwise they are queued and complete packets executed.
    pub fn write_gp0(&mut self, value: u32) {
        log::trace!("GP0 <- 0x{:08X}", value);
        self.gpuread_latched = false;

        if self.is_receiving_pixels() {
            self.process_vram_write(value);
            return;
        }
        if self.polyline.is_some() {
            self.process_polyline_word(value);
            return;
        }
        if !self.fifo.push(value) {
            log::warn!("GP0 FIFO full, dropping 0x{:08X}", value);
            return;
        }
        self.process_fifo();
    }

    /// Execute every complete packet at the head of the FIFO
    fn process_fifo(&mut self) {
        while let Some(word) = self.fifo.peek(0) {
            if self.is_receiving_pixels() {
                self.fifo.pop();
                self.process_vram_write(word);
                continue;
            }
            if self.polyline.is_some() {
                self.fifo.pop();
                self.process_polyline_word(word);
                continue;
            }

            let packet = match Packet::decode(word) {
                Ok(packet) => packet,
                Err(err) => {
                    log::warn!("{}, dropping word", err);
                    self.fifo.pop();
                    continue;
                }
            };

            let len = packet.word_count();
            if self.fifo.len() < len {
                return;
            }
            let mut buffer = [0u32; 12];
            let words = self.fifo.pop_into(len, &mut buffer);
            self.execute(packet, words);
        }
    }

    /// Dispatch a complete packet
    fn execute(&mut self, packet: Packet, words: &[u32]) {
        match packet {
            Packet::Nop => {}
            Packet::ClearCache => log::trace!("GP0 clear texture cache"),
            Packet::FillRectangle => self.gp0_fill_rectangle(words),
            Packet::IrqRequest => self.gp0_interrupt_request(),
            Packet::Polygon(flags) => self.gp0_polygon(flags, words),
            Packet::Line(flags) => self.gp0_line(flags, words),
            Packet::Rectangle(flags) => self.gp0_rectangle(flags, words),
            Packet::VramToVram => self.gp0_vram_to_vram_transfer(words),
            Packet::CpuToVram => self.gp0_cpu_to_vram_transfer(words),
            Packet::VramToCpu => self.gp0_vram_to_cpu_transfer(words),
            Packet::DrawMode => self.gp0_draw_mode(words[0]),
            Packet::TextureWindow => self.gp0_texture_window(words[0]),
            Packet::DrawAreaTopLeft => self.gp0_draw_area_top_left(words[0]),
            Packet::DrawAreaBottomRight => self.gp0_draw_area_bottom_right(words[0]),
            Packet::DrawOffset => self.gp0_draw_offset(words[0]),
            Packet::MaskSettings => self.gp0_mask_settings(words[0]),
        }
    }

    /// Read GPUREAD
    ///
    /// Returns two pixels during a VRAM→CPU transfer, otherwise the value
    /// latched by the last GP1(10h) query.
    pub fn read_gpuread(&mut self) -> u32 {
        let Some(mut transfer) = self.vram_transfer.take() else {
            return self.gpuread;
        };
        if transfer.direction != VRAMTransferDirection::VramToCpu {
            self.vram_transfer = Some(transfer);
            return self.gpuread;
        }

        let mut word = 0u32;
        for half in 0..2 {
            if let Some((x, y)) = transfer.next_pixel() {
                word |= (self.read_vram(x, y) as u32) << (half * 16);
            }
        }

        if transfer.is_done() {
            log::debug!("VRAM→CPU transfer complete");
        } else {
            self.vram_transfer = Some(transfer);
        }
        self.gpuread = word;
        word
    }

    /// Read the GP0 port (0x1F801810)
    ///
    /// The port yields GPUREAD only while a VRAM→CPU transfer is streaming or
    /// a GP1(10h) response is latched; a read of the command register
    /// otherwise returns GPUSTAT.
    pub fn read_gp0_port(&mut self) -> u32 {
        let streaming = self
            .vram_transfer
            .as_ref()
            .is_some_and(|t| t.direction == VRAMTransferDirection::VramToCpu);
        if streaming || self.gpuread_latched {
            self.read_gpuread()
        } else {
            self.status()
        }
    }

    /// Process a GP1 word
    pub fn write_gp1(&mut self, value: u32) {
        let command = (value >> 24) & 0xFF;
        log::trace!("GP1 <- 0x{:08X}", value);

        match command {
            0x00 => self.gp1_reset_gpu(),
            0x01 => self.gp1_reset_command_buffer(),
            0x02 => self.gp1_acknowledge_interrupt(),
            0x03 => self.gp1_display_enable(value),
            0x04 => self.gp1_dma_direction(value),
            0x05 => self.gp1_display_area_start(value),
            0x06 => self.gp1_horizontal_display_range(value),
            0x07 => self.gp1_vertical_display_range(value),
            0x08 => self.gp1_display_mode(value),
            0x10..=0x1F => self.gp1_get_gpu_info(value),
            _ => log::warn!("{}", GpuError::InvalidGp1Command { command: value }),
        }
    }

    /// Rebuild register state from a GPUSTAT word, FIFO slots and raster line
    ///
    /// Fields that GPUSTAT does not carry (drawing area, offset, texture
    /// window, display start) keep their current values. A VRAM transfer or
    /// polyline in flight has no slot in the record and is cancelled, as is
    /// a latched GP1(10h) response.
    pub(crate) fn restore(
        &mut self,
        status: u32,
        fifo: [u32; FIFO_SLOTS],
        fifo_beg: u32,
        fifo_end: u32,
        line: u32,
    ) {
        self.draw_mode = DrawMode {
            texture_x_flip: self.draw_mode.texture_x_flip,
            texture_y_flip: self.draw_mode.texture_y_flip,
            ..DrawMode::from_bits((status & 0x7FF) | (((status >> 15) & 1) << 11))
        };
        self.rasterizer
            .set_mask_settings(status & (1 << 11) != 0, status & (1 << 12) != 0);
        self.display_mode = DisplayMode::from_status(status);
        self.display_area.width = self.display_mode.horizontal_res().width();
        self.display_area.height = match self.display_mode.vertical_res() {
            VerticalRes::R240 => 240,
            VerticalRes::R480 => 480,
        };
        self.display_disabled = status & (1 << 23) != 0;
        self.interrupt_request = status & (1 << 24) != 0;
        self.dma_direction = DmaDirection::from((status >> 29) & 3);
        self.odd_line = status & (1 << 31) != 0;
        self.vram_transfer = None;
        self.polyline = None;
        self.gpuread_latched = false;
        self.fifo.restore(fifo, fifo_beg, fifo_end);
        self.line = (line as u16) % self.lines_per_frame;
    }
}

impl Default for GPU {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaTarget for GPU {
    fn dma_write(&mut self, word: u32) {
        self.write_gp0(word);
    }

    fn dma_read(&mut self) -> u32 {
        self.read_gpuread()
    }
}

impl IODevice for GPU {
    fn address_range(&self) -> (u32, u32) {
        (Self::GP0, Self::GP1 + 3)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        Ok(match offset & !0x3 {
            0x0 => self.read_gp0_port(),
            _ => self.status(),
        })
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset & !0x3 {
            0x0 => self.write_gp0(value),
            _ => self.write_gp1(value),
        }
        Ok(())
    }

    // GP0/GP1 are write-only command ports; a narrow store is forwarded as
    // a zero-extended command word rather than merged with GPUREAD/GPUSTAT.
    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let shift = (offset & 0x2) * 8;
        self.write_register(offset, (value as u32) << shift)
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let shift = (offset & 0x3) * 8;
        self.write_register(offset, (value as u32) << shift)
    }

    fn name(&self) -> &str {
        "GPU"
    }
}
