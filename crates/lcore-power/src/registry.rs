// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-core power state registry.
//!
//! The registry owns one slot per core id. A slot is either empty
//! (uninitialised) or holds the [`ActiveCore`] state captured at activation:
//! the frequency catalog, the governor to restore, and the current index.
//!
//! # Locking
//! Every slot sits behind its own `Mutex`. Activation, deactivation and
//! every controller mutation for a core run entirely under that core's lock,
//! bridge I/O included, so a reader can never observe a half-activated or
//! half-torn-down core. Distinct cores never share a lock.
//!
//! # Ordering
//! Bridge I/O always happens before the slot is updated. If the bridge
//! fails, the slot is left exactly as it was.

use crate::catalog::FrequencyCatalog;
use crate::{CoreId, PowerBridge, PowerError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default upper bound on core ids.
pub const DEFAULT_MAX_CORES: usize = 128;

/// Default limit on the number of frequencies a catalog may hold.
pub const DEFAULT_MAX_FREQUENCIES: usize = 64;

/// Governor installed while a core is under manual control.
pub const DEFAULT_CONTROL_GOVERNOR: &str = "userspace";

/// State held for a core while power control is active.
#[derive(Debug, Clone)]
pub(crate) struct ActiveCore {
    pub(crate) catalog: FrequencyCatalog,
    pub(crate) saved_governor: String,
    pub(crate) index: usize,
}

type Slot = Mutex<Option<ActiveCore>>;

/// Tracks which cores are under power control.
///
/// Constructed and owned by the caller; independent registries never share
/// state.
#[derive(Debug)]
pub struct CoreRegistry {
    slots: Box<[Slot]>,
    control_governor: String,
    max_frequencies: usize,
}

impl CoreRegistry {
    /// Creates a registry for core ids `[0, max_cores)` with default limits.
    pub fn new(max_cores: usize) -> Self {
        Self::with_settings(max_cores, DEFAULT_CONTROL_GOVERNOR, DEFAULT_MAX_FREQUENCIES)
    }

    /// Creates a registry with an explicit control governor and catalog limit.
    pub fn with_settings(
        max_cores: usize,
        control_governor: impl Into<String>,
        max_frequencies: usize,
    ) -> Self {
        Self {
            slots: (0..max_cores).map(|_| Mutex::new(None)).collect(),
            control_governor: control_governor.into(),
            max_frequencies,
        }
    }

    /// Number of addressable core ids.
    pub fn max_cores(&self) -> usize {
        self.slots.len()
    }

    /// Governor held on active cores.
    pub fn control_governor(&self) -> &str {
        &self.control_governor
    }

    /// Puts `core` under power control.
    ///
    /// Captures the current governor, installs the control governor,
    /// enumerates the catalog and seeds the current index from the frequency
    /// the OS reports. If any step after the governor switch fails, the
    /// captured governor is written back before the error is returned.
    pub fn activate<B: PowerBridge + ?Sized>(&self, bridge: &B, core: CoreId) -> Result<()> {
        let mut slot = self.lock(core)?;
        if slot.is_some() {
            return Err(PowerError::AlreadyActive(core));
        }

        let saved_governor = bridge.read_governor(core)?;
        bridge.write_governor(core, &self.control_governor)?;

        let prepared = bridge
            .enumerate_frequencies(core)
            .map_err(PowerError::from)
            .and_then(|reported| {
                FrequencyCatalog::from_reported(core, reported, self.max_frequencies)
            })
            .and_then(|catalog| {
                let current = bridge.read_current_frequency(core)?;
                let index = catalog.index_of(current);
                Ok((catalog, index))
            });

        let (catalog, index) = match prepared {
            Ok(ready) => ready,
            Err(e) => {
                if let Err(restore) = bridge.write_governor(core, &saved_governor) {
                    tracing::warn!(
                        "core {core}: failed to restore governor '{saved_governor}' after aborted activation: {restore}"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            "core {core}: power control active ({} frequencies, {}..{} kHz, saved governor '{saved_governor}', index {index})",
            catalog.len(),
            catalog.min_khz(),
            catalog.max_khz(),
        );

        *slot = Some(ActiveCore {
            catalog,
            saved_governor,
            index,
        });
        Ok(())
    }

    /// Releases power control of `core`, restoring the saved governor.
    ///
    /// If the governor cannot be restored the core stays active.
    pub fn deactivate<B: PowerBridge + ?Sized>(&self, bridge: &B, core: CoreId) -> Result<()> {
        let mut slot = self.lock(core)?;
        let saved_governor = match slot.as_ref() {
            Some(active) => active.saved_governor.clone(),
            None => return Err(PowerError::NotActive(core)),
        };

        bridge.write_governor(core, &saved_governor)?;
        *slot = None;

        tracing::info!("core {core}: power control released, governor '{saved_governor}' restored");
        Ok(())
    }

    /// Returns `true` if `core` is in range and active.
    pub fn is_active(&self, core: CoreId) -> bool {
        self.lock(core).map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Active core ids in ascending order.
    pub fn active_cores(&self) -> Vec<CoreId> {
        (0..self.slots.len())
            .filter(|&core| self.is_active(core))
            .collect()
    }

    /// Runs `f` on the state of an active core while holding its lock.
    pub(crate) fn with_active<T>(
        &self,
        core: CoreId,
        f: impl FnOnce(&mut ActiveCore) -> Result<T>,
    ) -> Result<T> {
        let mut slot = self.lock(core)?;
        match slot.as_mut() {
            Some(active) => f(active),
            None => Err(PowerError::NotActive(core)),
        }
    }

    /// Locks the slot for `core`.
    ///
    /// A poisoned lock is recovered: slot contents are only replaced after
    /// bridge I/O succeeds, so a panic mid-operation cannot leave them torn.
    fn lock(&self, core: CoreId) -> Result<MutexGuard<'_, Option<ActiveCore>>> {
        let slot = self.slots.get(core).ok_or(PowerError::InvalidCore {
            core,
            max_cores: self.slots.len(),
        })?;
        Ok(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for CoreRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CORES)
    }
}
