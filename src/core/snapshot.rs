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

//! Machine snapshots
//!
//! A snapshot is the shared-state record taken at a tick boundary plus a
//! small metadata header, encoded with bincode. Because the payload is the
//! same byte layout the host already understands, a snapshot file can also be
//! inspected offline with nothing but the field offsets.
//!
//! # Version Compatibility
//!
//! Snapshots carry a version number. Loading a snapshot written with a
//! different version fails with [`EmulatorError::Snapshot`].
//!
//! # Example
//!
//! ```no_run
//! use xsp::core::snapshot::Snapshot;
//! use xsp::core::System;
//!
//! let mut system = System::new();
//! // ... run ...
//!
//! let snapshot = Snapshot::capture(&system);
//! snapshot.save_to_file("machine.snap").unwrap();
//!
//! let loaded = Snapshot::load_from_file("machine.snap").unwrap();
//! loaded.apply(&mut system).unwrap();
//! ```

use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::error::{EmulatorError, Result};
use super::shared_state::{Field, SharedState};
use super::system::System;

/// Snapshot format version
///
/// Bump whenever the metadata or the shared-state layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SnapshotMetadata {
    /// Format version
    pub version: u32,

    /// When the snapshot was taken
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Completed ticks at capture time
    pub tick: u64,

    /// Completed video frames at capture time
    pub frames: u64,
}

/// Complete machine snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,

    /// Shared-state export
    pub state: Vec<u8>,
}

impl Snapshot {
    /// Capture the current machine state
    pub fn capture(system: &System) -> Self {
        Self {
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION,
                timestamp: Utc::now(),
                tick: system.ticks(),
                frames: system.frames(),
            },
            state: SharedState::export(system),
        }
    }

    /// Load this snapshot into `system`
    ///
    /// # Errors
    ///
    /// `StateLayout` if the payload does not match the current layout.
    pub fn apply(&self, system: &mut System) -> Result<()> {
        SharedState::import(system, &self.state)?;
        system.restore_counters(self.metadata.tick, self.metadata.frames);
        log::info!(
            "Restored snapshot from {} (tick {})",
            self.metadata.timestamp.to_rfc3339(),
            self.metadata.tick
        );
        Ok(())
    }

    /// Encode to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::Snapshot(e.to_string()))
    }

    /// Decode from bytes, checking the version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (snapshot, _): (Snapshot, usize) =
            bincode::decode_from_slice(bytes, config::standard())
                .map_err(|e| EmulatorError::Snapshot(e.to_string()))?;

        if snapshot.metadata.version != SNAPSHOT_VERSION {
            return Err(EmulatorError::Snapshot(format!(
                "Incompatible snapshot version: expected {}, got {}",
                SNAPSHOT_VERSION, snapshot.metadata.version
            )));
        }
        Ok(snapshot)
    }

    /// Save to a binary file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use xsp::core::{System, snapshot::Snapshot};
    /// # let system = System::new();
    /// Snapshot::capture(&system).save_to_file("machine.snap").unwrap();
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(&encoded)?;
        log::info!(
            "Snapshot written to {} ({} bytes)",
            path.as_ref().display(),
            encoded.len()
        );
        Ok(())
    }

    /// Load from a binary file
    ///
    /// # Errors
    ///
    /// - `EmulatorError::Io` if the file cannot be read
    /// - `EmulatorError::Snapshot` if decoding fails or the version differs
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    fn word(&self, field: Field, index: usize) -> u32 {
        SharedState::read_word(&self.state, field, index).unwrap_or(0)
    }

    /// Human-readable summary (PC, registers, interrupt and GPU state)
    pub fn to_json_summary(&self) -> Result<String> {
        let regs: Vec<String> = (0..32)
            .map(|i| format!("0x{:08X}", self.word(Field::Regs, i)))
            .collect();
        let hex = |value: u32| format!("0x{:08X}", value);

        let summary = serde_json::json!({
            "version": self.metadata.version,
            "timestamp": self.metadata.timestamp.to_rfc3339(),
            "tick": self.metadata.tick,
            "frames": self.metadata.frames,
            "state_bytes": self.state.len(),
            "cpu": {
                "pc": hex(self.word(Field::Pc, 0)),
                "pcdiff": self.word(Field::PcDiff, 0) as i32,
                "hi": hex(self.word(Field::Rhi, 0)),
                "lo": hex(self.word(Field::Rlo, 0)),
                "regs": regs,
                "sr": hex(self.word(Field::C0Regs, 12)),
                "cause": hex(self.word(Field::C0Regs, 13)),
                "epc": hex(self.word(Field::C0Regs, 14)),
                "fault_cause": self.word(Field::FaultCause, 0),
                "fault_pc": hex(self.word(Field::FaultPc, 0)),
            },
            "irq": {
                "i_stat": hex(self.word(Field::IStat, 0)),
                "i_mask": hex(self.word(Field::IMask, 0)),
            },
            "gpu": {
                "status": hex(self.word(Field::GpuStat, 0)),
                "line": self.word(Field::GpuY, 0),
            },
            "dma": {
                "dpcr": hex(self.word(Field::Dpcr, 0)),
                "dicr": hex(self.word(Field::Dicr, 0)),
            },
            "xcomms": self.word(Field::Xcomms, 0) as i32,
        });

        serde_json::to_string_pretty(&summary).map_err(|e| EmulatorError::Snapshot(e.to_string()))
    }
}
