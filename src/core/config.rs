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

//! Engine configuration
//!
//! Settings come from several sources, highest priority first:
//! 1. Command line flags (applied by the binary)
//! 2. `XSP_*` environment variables (a `.env` file is loaded first by the
//!    binary through dotenvy)
//! 3. A TOML file (`--config PATH`, else `./xsp.toml` when present)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! bios_path = "bios/SCPH1001.BIN"
//! font_path = "assets/font.tga"
//! instructions_per_tick = 2150
//! lines_per_frame = 263
//! vblank_start = 240
//! trace_path = "trace.log"
//! trace_limit = 100000
//! log_every_ticks = 0
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{EmulatorError, Result};

/// Engine configuration
///
/// Every field has a default, so a partial file is valid.
///
/// # Example
/// ```
/// use xsp::core::config::Config;
///
/// let config: Config = "instructions_per_tick = 1000".parse().unwrap();
/// assert_eq!(config.instructions_per_tick, 1000);
/// assert_eq!(config.lines_per_frame, 263);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boot ROM image (exactly 512 KB)
    pub bios_path: Option<PathBuf>,

    /// TGA glyph atlas for the console overlay
    pub font_path: Option<PathBuf>,

    /// CPU instructions executed per tick
    pub instructions_per_tick: u32,

    /// Raster lines per video frame
    pub lines_per_frame: u16,

    /// First vertical blank line
    pub vblank_start: u16,

    /// Instruction trace output file
    pub trace_path: Option<PathBuf>,

    /// Maximum traced instructions (0 = unlimited)
    pub trace_limit: usize,

    /// Log a status line every N ticks (0 = never)
    pub log_every_ticks: u64,
}

impl Config {
    /// Project-local config file name
    pub const DEFAULT_FILE: &'static str = "xsp.toml";

    /// 263 ticks per frame at 33.8688 MHz, 60 Hz and roughly 2 clocks per
    /// instruction
    pub const DEFAULT_INSTRUCTIONS_PER_TICK: u32 = 2_150;

    /// Load a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EmulatorError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = content.parse()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the file and environment layers
    ///
    /// An explicit `path` must exist. Without one, `./xsp.toml` is used when
    /// present. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(Self::DEFAULT_FILE).exists() => Self::from_file(Self::DEFAULT_FILE)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        log::debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// Apply `XSP_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    ///
    /// Recognised keys: `XSP_BIOS`, `XSP_FONT`, `XSP_INSTRUCTIONS_PER_TICK`,
    /// `XSP_LINES_PER_FRAME`, `XSP_VBLANK_START`, `XSP_TRACE`,
    /// `XSP_TRACE_LIMIT`, `XSP_LOG_EVERY_TICKS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("XSP_BIOS") {
            log::info!("Using XSP_BIOS from environment: {}", path);
            self.bios_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("XSP_FONT") {
            self.font_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("XSP_TRACE") {
            self.trace_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("XSP_INSTRUCTIONS_PER_TICK") {
            self.instructions_per_tick = parse_number("XSP_INSTRUCTIONS_PER_TICK", &value)?;
        }
        if let Some(value) = lookup("XSP_LINES_PER_FRAME") {
            self.lines_per_frame = parse_number("XSP_LINES_PER_FRAME", &value)?;
        }
        if let Some(value) = lookup("XSP_VBLANK_START") {
            self.vblank_start = parse_number("XSP_VBLANK_START", &value)?;
        }
        if let Some(value) = lookup("XSP_TRACE_LIMIT") {
            self.trace_limit = parse_number("XSP_TRACE_LIMIT", &value)?;
        }
        if let Some(value) = lookup("XSP_LOG_EVERY_TICKS") {
            self.log_every_ticks = parse_number("XSP_LOG_EVERY_TICKS", &value)?;
        }
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.instructions_per_tick == 0 {
            return Err(EmulatorError::Config(
                "instructions_per_tick must be at least 1".to_string(),
            ));
        }
        if self.vblank_start >= self.lines_per_frame {
            return Err(EmulatorError::Config(format!(
                "vblank_start ({}) must be below lines_per_frame ({})",
                self.vblank_start, self.lines_per_frame
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bios_path: None,
            font_path: None,
            instructions_per_tick: Self::DEFAULT_INSTRUCTIONS_PER_TICK,
            lines_per_frame: 263,
            vblank_start: 240,
            trace_path: None,
            trace_limit: 0,
            log_every_ticks: 0,
        }
    }
}

impl FromStr for Config {
    type Err = EmulatorError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EmulatorError::Config(e.to_string()))
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EmulatorError::Config(format!("{} is not a valid number: {:?}", key, value)))
}
