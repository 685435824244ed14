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

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};
use xsp::core::config::Config;
use xsp::core::display::{Framebuffer, GlyphAtlas};
use xsp::core::error::{EmulatorError, Result};
use xsp::core::snapshot::Snapshot;
use xsp::core::system::System;

/// Headless host for the xsp engine
#[derive(Parser)]
#[command(name = "xsp")]
#[command(about = "Tick-driven PlayStation-class console engine", long_about = None)]
struct Args {
    /// Path to the BIOS image (e.g., SCPH1001.BIN); falls back to the config
    bios_file: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short = 'n', long, default_value_t = 263 * 60)]
    ticks: u64,

    /// TGA glyph atlas for the console overlay
    #[arg(long)]
    font: Option<PathBuf>,

    /// TOML configuration file (default: ./xsp.toml if present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write an instruction trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write a snapshot of the final state to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write the final composed frame as raw RGBA8 (800x600) to this file
    #[arg(long)]
    dump_frame: Option<PathBuf>,
}

impl Args {
    /// CLI flags take precedence over every other config layer
    fn apply_to(&self, config: &mut Config) {
        if let Some(bios) = &self.bios_file {
            config.bios_path = Some(bios.clone());
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        if let Some(trace) = &self.trace {
            config.trace_path = Some(trace.clone());
        }
    }
}

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("xsp v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).inspect_err(|e| {
        error!("Failed to load configuration: {}", e);
    })?;
    args.apply_to(&mut config);

    let bios_path = config.bios_path.clone().ok_or_else(|| {
        error!("No BIOS given (argument, XSP_BIOS or bios_path in xsp.toml)");
        EmulatorError::Config("no BIOS path".to_string())
    })?;

    let mut system = System::with_config(&config);

    info!("Loading BIOS from: {}", bios_path.display());
    if let Err(e) = system.load_bios(&bios_path) {
        error!("Failed to load BIOS: {}", e);
        return Err(e);
    }
    info!("BIOS loaded successfully");

    let atlas = match &config.font_path {
        Some(path) => GlyphAtlas::load_tga(path).unwrap_or_else(|e| {
            warn!("Failed to load glyph atlas {}: {}", path.display(), e);
            GlyphAtlas::builtin()
        }),
        None => GlyphAtlas::builtin(),
    };

    if let Some(trace_path) = &config.trace_path {
        system.enable_tracing(trace_path, config.trace_limit)?;
        info!(
            "CPU tracing enabled: {} (limit: {})",
            trace_path.display(),
            config.trace_limit
        );
    }

    system.set_comms(1);
    run(&mut system, args.ticks, config.log_every_ticks)?;
    system.disable_tracing();

    info!("Emulation completed");
    info!(
        "Ticks: {} | Frames: {} | Instructions: {} | PC: 0x{:08X}",
        system.ticks(),
        system.frames(),
        system.cycles(),
        system.pc()
    );
    let (cause, fault_pc) = system.cpu().last_fault();
    info!("Last exception: code {} at 0x{:08X}", cause, fault_pc);

    if let Some(path) = &args.snapshot {
        Snapshot::capture(&system).save_to_file(path)?;
    }

    if let Some(path) = &args.dump_frame {
        let frame = Framebuffer::compose(system.gpu(), system.console(), &atlas);
        frame.write_raw(path)?;
        info!("Frame written to {}", path.display());
    }

    Ok(())
}

/// Run `ticks` ticks, reporting the tick rate once per second
fn run(system: &mut System, ticks: u64, log_every: u64) -> Result<()> {
    let mut window_start = Instant::now();
    let mut window_ticks = 0u64;

    for i in 0..ticks {
        system.tick().inspect_err(|e| {
            error!("Tick {} failed at PC=0x{:08X}: {}", i, system.pc(), e);
            error!("{}", system.cpu().register_dump());
        })?;
        window_ticks += 1;

        let elapsed = window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            info!(
                "{:.0} ticks/s | frame {} | PC: 0x{:08X}",
                window_ticks as f64 / elapsed.as_secs_f64(),
                system.frames(),
                system.pc()
            );
            window_start = Instant::now();
            window_ticks = 0;
        }

        if log_every != 0 && (i + 1) % log_every == 0 {
            info!(
                "Progress: {}/{} ticks | PC: 0x{:08X} | Instructions: {}",
                i + 1,
                ticks,
                system.pc(),
                system.cycles()
            );
        }
    }
    Ok(())
}
