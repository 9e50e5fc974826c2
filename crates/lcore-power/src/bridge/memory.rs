// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-memory [`PowerBridge`] for tests and dry runs.
//!
//! Behaves like a core running the `userspace` governor: a target write
//! takes effect immediately and is reflected by the next current-frequency
//! read. Recent governor and target writes are recorded so callers can check
//! exactly what would have reached the OS, and any operation can be made to
//! fail on demand.

use crate::{BridgeError, CoreId, PowerBridge};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A bridge operation, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    ReadGovernor,
    WriteGovernor,
    EnumerateFrequencies,
    ReadCurrentFrequency,
    WriteTargetFrequency,
}

impl BridgeOp {
    fn file_name(self) -> &'static str {
        match self {
            BridgeOp::ReadGovernor | BridgeOp::WriteGovernor => "scaling_governor",
            BridgeOp::EnumerateFrequencies => "scaling_available_frequencies",
            BridgeOp::ReadCurrentFrequency => "scaling_cur_freq",
            BridgeOp::WriteTargetFrequency => "scaling_setspeed",
        }
    }
}

/// Writes kept per core; older entries are dropped first.
const HISTORY_LIMIT: usize = 1024;

#[derive(Debug, Default)]
struct FakeCore {
    governor: String,
    frequencies: Vec<u32>,
    current_khz: u32,
    governor_writes: Vec<String>,
    target_writes: Vec<u32>,
    failing: HashSet<BridgeOp>,
}

/// In-memory stand-in for the OS frequency-scaling interface.
///
/// Each core sits behind its own lock, so concurrent calls for different
/// cores never contend.
#[derive(Debug)]
pub struct MemoryBridge {
    cores: Vec<Mutex<Option<FakeCore>>>,
}

impl MemoryBridge {
    /// Creates a bridge with `slots` core ids, none of which expose a
    /// scaling interface until [`add_core`](Self::add_core) is called.
    pub fn new(slots: usize) -> Self {
        Self {
            cores: (0..slots).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Gives `core` a scaling interface.
    ///
    /// `frequencies` is reported verbatim by `enumerate_frequencies`, so tests
    /// may pass unsorted or duplicated lists. Ids beyond the slot count are
    /// ignored.
    pub fn add_core(&self, core: CoreId, governor: &str, frequencies: &[u32], current_khz: u32) {
        if let Some(slot) = self.cores.get(core) {
            *lock(slot) = Some(FakeCore {
                governor: governor.to_string(),
                frequencies: frequencies.to_vec(),
                current_khz,
                ..FakeCore::default()
            });
        }
    }

    /// Makes every subsequent `op` on `core` fail until [`heal`](Self::heal).
    pub fn fail(&self, core: CoreId, op: BridgeOp) {
        self.with_core(core, |c| {
            c.failing.insert(op);
        });
    }

    /// Clears an injected failure.
    pub fn heal(&self, core: CoreId, op: BridgeOp) {
        self.with_core(core, |c| {
            c.failing.remove(&op);
        });
    }

    /// Returns the governor currently installed on `core`.
    pub fn governor(&self, core: CoreId) -> Option<String> {
        self.with_core(core, |c| c.governor.clone())
    }

    /// Returns the frequency `core` is currently running at.
    pub fn current_khz(&self, core: CoreId) -> Option<u32> {
        self.with_core(core, |c| c.current_khz)
    }

    /// Returns the governors written to `core`, oldest first.
    pub fn governor_writes(&self, core: CoreId) -> Vec<String> {
        self.with_core(core, |c| c.governor_writes.clone())
            .unwrap_or_default()
    }

    /// Returns the target frequencies written to `core`, oldest first.
    pub fn target_writes(&self, core: CoreId) -> Vec<u32> {
        self.with_core(core, |c| c.target_writes.clone())
            .unwrap_or_default()
    }

    fn with_core<T>(&self, core: CoreId, f: impl FnOnce(&mut FakeCore) -> T) -> Option<T> {
        let slot = self.cores.get(core)?;
        let mut guard = lock(slot);
        guard.as_mut().map(f)
    }

    fn access<T>(
        &self,
        core: CoreId,
        op: BridgeOp,
        f: impl FnOnce(&mut FakeCore) -> Result<T, BridgeError>,
    ) -> Result<T, BridgeError> {
        let path = format!("mem://cpu{core}/cpufreq/{}", op.file_name());
        let slot = self
            .cores
            .get(core)
            .ok_or_else(|| BridgeError::NotAvailable { path: path.clone() })?;
        let mut guard = lock(slot);
        let fake = guard
            .as_mut()
            .ok_or_else(|| BridgeError::NotAvailable { path: path.clone() })?;

        if fake.failing.contains(&op) {
            let source = std::io::Error::new(std::io::ErrorKind::Other, "injected failure");
            return Err(match op {
                BridgeOp::WriteGovernor | BridgeOp::WriteTargetFrequency => {
                    BridgeError::WriteError { path, source }
                }
                _ => BridgeError::ReadError { path, source },
            });
        }
        f(fake)
    }
}

fn lock(slot: &Mutex<Option<FakeCore>>) -> MutexGuard<'_, Option<FakeCore>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record<T>(history: &mut Vec<T>, entry: T) {
    if history.len() == HISTORY_LIMIT {
        history.remove(0);
    }
    history.push(entry);
}

impl PowerBridge for MemoryBridge {
    fn read_governor(&self, core: CoreId) -> Result<String, BridgeError> {
        self.access(core, BridgeOp::ReadGovernor, |c| Ok(c.governor.clone()))
    }

    fn write_governor(&self, core: CoreId, governor: &str) -> Result<(), BridgeError> {
        self.access(core, BridgeOp::WriteGovernor, |c| {
            c.governor = governor.to_string();
            record(&mut c.governor_writes, governor.to_string());
            Ok(())
        })
    }

    fn enumerate_frequencies(&self, core: CoreId) -> Result<Vec<u32>, BridgeError> {
        self.access(core, BridgeOp::EnumerateFrequencies, |c| {
            Ok(c.frequencies.clone())
        })
    }

    fn read_current_frequency(&self, core: CoreId) -> Result<u32, BridgeError> {
        self.access(core, BridgeOp::ReadCurrentFrequency, |c| Ok(c.current_khz))
    }

    fn write_target_frequency(&self, core: CoreId, khz: u32) -> Result<(), BridgeError> {
        self.access(core, BridgeOp::WriteTargetFrequency, |c| {
            c.current_khz = khz;
            record(&mut c.target_writes, khz);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_core_not_available() {
        let bridge = MemoryBridge::new(4);
        assert!(matches!(
            bridge.read_governor(1),
            Err(BridgeError::NotAvailable { .. })
        ));
        assert!(matches!(
            bridge.read_governor(99),
            Err(BridgeError::NotAvailable { .. })
        ));
    }

    #[test]
    fn test_target_write_updates_current() {
        let bridge = MemoryBridge::new(4);
        bridge.add_core(1, "ondemand", &[2_000_000, 1_000_000], 2_000_000);
        bridge.write_target_frequency(1, 1_000_000).unwrap();
        assert_eq!(bridge.read_current_frequency(1).unwrap(), 1_000_000);
        assert_eq!(bridge.target_writes(1), vec![1_000_000]);
    }

    #[test]
    fn test_injected_failure_and_heal() {
        let bridge = MemoryBridge::new(2);
        bridge.add_core(0, "ondemand", &[1_000_000], 1_000_000);
        bridge.fail(0, BridgeOp::WriteGovernor);

        let err = bridge.write_governor(0, "userspace").unwrap_err();
        assert!(matches!(err, BridgeError::WriteError { .. }));
        assert_eq!(bridge.governor(0).as_deref(), Some("ondemand"));
        assert!(bridge.governor_writes(0).is_empty());

        bridge.heal(0, BridgeOp::WriteGovernor);
        bridge.write_governor(0, "userspace").unwrap();
        assert_eq!(bridge.governor(0).as_deref(), Some("userspace"));
    }
}
