// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Power-control configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! sysfs_root = "/sys/devices/system/cpu"
//! max_cores = 128
//! max_frequencies = 64
//! control_governor = "userspace"
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::bridge::sysfs::DEFAULT_SYSFS_ROOT;
use crate::registry::{
    CoreRegistry, DEFAULT_CONTROL_GOVERNOR, DEFAULT_MAX_CORES, DEFAULT_MAX_FREQUENCIES,
};
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration for a sysfs-backed [`PowerManager`](crate::PowerManager).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Directory holding the per-core `cpuN/cpufreq/` trees.
    pub sysfs_root: PathBuf,
    /// Number of addressable core ids; valid ids are `[0, max_cores)`.
    pub max_cores: usize,
    /// Largest frequency catalog accepted at activation.
    pub max_frequencies: usize,
    /// Governor held on a core while it is under manual control.
    pub control_governor: String,
}

impl PowerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialise(e.to_string()))
    }

    /// Checks that the limits and governor name are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cores == 0 {
            return Err(ConfigError::Invalid("max_cores must be at least 1".into()));
        }
        if self.max_frequencies == 0 {
            return Err(ConfigError::Invalid(
                "max_frequencies must be at least 1".into(),
            ));
        }
        if self.control_governor.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "control_governor must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Creates an empty registry with these limits.
    pub fn registry(&self) -> CoreRegistry {
        CoreRegistry::with_settings(
            self.max_cores,
            self.control_governor.trim(),
            self.max_frequencies,
        )
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            max_cores: DEFAULT_MAX_CORES,
            max_frequencies: DEFAULT_MAX_FREQUENCIES,
            control_governor: DEFAULT_CONTROL_GOVERNOR.to_string(),
        }
    }
}
