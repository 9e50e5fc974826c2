// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The OS power bridge: the only place that touches the frequency-scaling
//! interface.
//!
//! The registry and controller never perform I/O themselves; they drive a
//! [`PowerBridge`]. Two implementations ship with the crate:
//!
//! - [`SysfsBridge`]: the Linux cpufreq adapter (`/sys/devices/system/cpu`).
//! - [`MemoryBridge`]: an in-memory fake with failure injection, used by
//!   tests and dry runs.

pub mod memory;
pub mod sysfs;

pub use memory::{BridgeOp, MemoryBridge};
pub use sysfs::SysfsBridge;

use crate::{BridgeError, CoreId};

/// Per-core access to the OS frequency-scaling interface.
///
/// Frequencies are in kHz. Implementations must be safe to call for
/// different cores from different threads at the same time; callers never
/// issue concurrent calls for the same core.
pub trait PowerBridge: Send + Sync {
    /// Reads the governor currently in charge of `core`.
    fn read_governor(&self, core: CoreId) -> Result<String, BridgeError>;

    /// Installs `governor` on `core`.
    fn write_governor(&self, core: CoreId, governor: &str) -> Result<(), BridgeError>;

    /// Lists the frequencies `core` supports, in whatever order the OS reports.
    fn enumerate_frequencies(&self, core: CoreId) -> Result<Vec<u32>, BridgeError>;

    /// Reads the frequency `core` is currently running at.
    fn read_current_frequency(&self, core: CoreId) -> Result<u32, BridgeError>;

    /// Requests that `core` run at `khz`.
    fn write_target_frequency(&self, core: CoreId, khz: u32) -> Result<(), BridgeError>;
}

impl<B: PowerBridge + ?Sized> PowerBridge for std::sync::Arc<B> {
    fn read_governor(&self, core: CoreId) -> Result<String, BridgeError> {
        (**self).read_governor(core)
    }

    fn write_governor(&self, core: CoreId, governor: &str) -> Result<(), BridgeError> {
        (**self).write_governor(core, governor)
    }

    fn enumerate_frequencies(&self, core: CoreId) -> Result<Vec<u32>, BridgeError> {
        (**self).enumerate_frequencies(core)
    }

    fn read_current_frequency(&self, core: CoreId) -> Result<u32, BridgeError> {
        (**self).read_current_frequency(core)
    }

    fn write_target_frequency(&self, core: CoreId, khz: u32) -> Result<(), BridgeError> {
        (**self).write_target_frequency(core, khz)
    }
}
