// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Linux cpufreq adapter.
//!
//! Reads and writes the per-core files under
//! `/sys/devices/system/cpu/cpuN/cpufreq/`:
//! - `scaling_governor`: active governor name.
//! - `scaling_available_frequencies`: whitespace-separated kHz values.
//! - `scaling_cur_freq`: current frequency in kHz.
//! - `scaling_setspeed`: target frequency in kHz; only honoured while the
//!   `userspace` governor is installed.
//!
//! The root directory is configurable so the adapter can be pointed at a
//! fake tree in tests.

use crate::{BridgeError, CoreId, PowerBridge};
use std::path::{Path, PathBuf};

/// Default sysfs path for CPU information.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/devices/system/cpu";

const GOVERNOR_FILE: &str = "scaling_governor";
const AVAILABLE_FREQS_FILE: &str = "scaling_available_frequencies";
const CUR_FREQ_FILE: &str = "scaling_cur_freq";
const SETSPEED_FILE: &str = "scaling_setspeed";

/// [`PowerBridge`] backed by the Linux cpufreq sysfs interface.
#[derive(Debug, Clone)]
pub struct SysfsBridge {
    root: PathBuf,
}

impl SysfsBridge {
    /// Creates a bridge rooted at `/sys/devices/system/cpu`.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_SYSFS_ROOT)
    }

    /// Creates a bridge rooted at an arbitrary directory laid out like
    /// `/sys/devices/system/cpu`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory this bridge reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cpufreq_file(&self, core: CoreId, name: &str) -> PathBuf {
        self.root
            .join(format!("cpu{core}"))
            .join("cpufreq")
            .join(name)
    }
}

impl Default for SysfsBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerBridge for SysfsBridge {
    fn read_governor(&self, core: CoreId) -> Result<String, BridgeError> {
        let path = self.cpufreq_file(core, GOVERNOR_FILE);
        let governor = read_sysfs_file(&path)?;
        if governor.is_empty() {
            return Err(BridgeError::ParseError {
                path: path.display().to_string(),
                detail: "empty governor name".to_string(),
            });
        }
        Ok(governor)
    }

    fn write_governor(&self, core: CoreId, governor: &str) -> Result<(), BridgeError> {
        write_sysfs_file(&self.cpufreq_file(core, GOVERNOR_FILE), governor)
    }

    fn enumerate_frequencies(&self, core: CoreId) -> Result<Vec<u32>, BridgeError> {
        let path = self.cpufreq_file(core, AVAILABLE_FREQS_FILE);
        let content = read_sysfs_file(&path)?;
        parse_frequency_list(&content).map_err(|detail| BridgeError::ParseError {
            path: path.display().to_string(),
            detail,
        })
    }

    fn read_current_frequency(&self, core: CoreId) -> Result<u32, BridgeError> {
        read_khz(&self.cpufreq_file(core, CUR_FREQ_FILE))
    }

    fn write_target_frequency(&self, core: CoreId, khz: u32) -> Result<(), BridgeError> {
        write_sysfs_file(&self.cpufreq_file(core, SETSPEED_FILE), &khz.to_string())
    }
}

/// Reads a sysfs file and returns its trimmed content.
fn read_sysfs_file(path: &Path) -> Result<String, BridgeError> {
    if !path.exists() {
        return Err(BridgeError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| BridgeError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Writes `value` to an existing sysfs file.
///
/// sysfs attributes cannot be created, so a missing file is reported as
/// [`BridgeError::NotAvailable`] rather than silently creating one.
fn write_sysfs_file(path: &Path, value: &str) -> Result<(), BridgeError> {
    if !path.exists() {
        return Err(BridgeError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::write(path, value).map_err(|e| BridgeError::WriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reads a single kHz value.
fn read_khz(path: &Path) -> Result<u32, BridgeError> {
    let content = read_sysfs_file(path)?;
    content.parse::<u32>().map_err(|_| BridgeError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected integer kHz value, got '{content}'"),
    })
}

/// Parses `scaling_available_frequencies` content, e.g. `"2400000 2000000 1600000"`.
fn parse_frequency_list(s: &str) -> Result<Vec<u32>, String> {
    s.split_whitespace()
        .map(|tok| {
            tok.parse::<u32>()
                .map_err(|_| format!("expected integer kHz value, got '{tok}'"))
        })
        .collect()
}
