// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The frequency controller: the surface a power policy drives.
//!
//! ```text
//!   PowerManager::set_index(core, i)
//!         │
//!         ▼
//!   CoreRegistry ── lock core, require Active ──► NotActive
//!         │
//!         ▼
//!   FrequencyCatalog ── bounds check ──────────► InvalidIndex
//!         │
//!         ▼
//!   PowerBridge::write_target_frequency ───────► PowerIo
//!         │
//!         ▼
//!   record index
//! ```
//!
//! Index `0` is the maximum frequency. Stepping past either end of the
//! catalog is a successful no-op, so a policy can oscillate between
//! `step_up` and `step_down` without special-casing the edges. The
//! `Ok(bool)` returned by mutating operations reports whether the frequency
//! index moved, for callers that want a saturation signal.

use crate::bridge::SysfsBridge;
use crate::registry::{ActiveCore, CoreRegistry};
use crate::{ConfigError, CoreId, CoreStatus, PowerBridge, PowerConfig, PowerError, Result};

/// Per-core frequency control over a [`PowerBridge`].
///
/// Operations on one core are serialised by that core's lock; operations on
/// different cores proceed independently. `PowerManager` is `Send + Sync`
/// and can be shared across worker threads behind an `Arc`.
///
/// # Example
/// ```
/// use lcore_power::{MemoryBridge, PowerManager};
///
/// let bridge = MemoryBridge::new(4);
/// bridge.add_core(2, "ondemand", &[2_400_000, 2_000_000, 1_600_000], 2_400_000);
///
/// let power = PowerManager::new(bridge, 4);
/// power.activate(2).unwrap();
/// power.set_min(2).unwrap();
/// assert_eq!(power.current_index(2).unwrap(), 2);
/// power.step_up(2).unwrap();
/// assert_eq!(power.current_frequency(2).unwrap(), 2_000_000);
/// power.deactivate(2).unwrap();
/// ```
#[derive(Debug)]
pub struct PowerManager<B: PowerBridge> {
    bridge: B,
    registry: CoreRegistry,
}

impl PowerManager<SysfsBridge> {
    /// Builds a manager on the Linux cpufreq interface described by `config`.
    pub fn from_config(config: &PowerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_registry(
            SysfsBridge::with_root(config.sysfs_root.clone()),
            config.registry(),
        ))
    }
}

impl<B: PowerBridge> PowerManager<B> {
    /// Creates a manager for core ids `[0, max_cores)` with default limits.
    pub fn new(bridge: B, max_cores: usize) -> Self {
        Self::with_registry(bridge, CoreRegistry::new(max_cores))
    }

    /// Creates a manager around an existing registry.
    pub fn with_registry(bridge: B, registry: CoreRegistry) -> Self {
        Self { bridge, registry }
    }

    /// The underlying bridge.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// The underlying registry.
    pub fn registry(&self) -> &CoreRegistry {
        &self.registry
    }

    /// Puts `core` under power control. See [`CoreRegistry::activate`].
    pub fn activate(&self, core: CoreId) -> Result<()> {
        self.registry.activate(&self.bridge, core)
    }

    /// Releases `core`, restoring its saved governor.
    pub fn deactivate(&self, core: CoreId) -> Result<()> {
        self.registry.deactivate(&self.bridge, core)
    }

    /// Returns `true` if `core` is under power control.
    pub fn is_active(&self, core: CoreId) -> bool {
        self.registry.is_active(core)
    }

    /// Active core ids in ascending order.
    pub fn active_cores(&self) -> Vec<CoreId> {
        self.registry.active_cores()
    }

    /// Supported frequencies of `core` in kHz, highest first.
    pub fn list_frequencies(&self, core: CoreId) -> Result<Vec<u32>> {
        self.registry
            .with_active(core, |a| Ok(a.catalog.as_slice().to_vec()))
    }

    /// Current frequency index of `core`. No I/O.
    pub fn current_index(&self, core: CoreId) -> Result<usize> {
        self.registry.with_active(core, |a| Ok(a.index))
    }

    /// Catalog frequency at the current index of `core`. No I/O.
    pub fn current_frequency(&self, core: CoreId) -> Result<u32> {
        self.registry
            .with_active(core, |a| Ok(a.catalog.as_slice()[a.index]))
    }

    /// Snapshot of `core`'s power state.
    pub fn status(&self, core: CoreId) -> Result<CoreStatus> {
        self.registry
            .with_active(core, |a| Ok(CoreStatus::from_active(core, a)))
    }

    /// Applies catalog entry `index` to `core`.
    ///
    /// The frequency is always written, even if `index` is already current.
    /// Returns whether the recorded index changed.
    pub fn set_index(&self, core: CoreId, index: usize) -> Result<bool> {
        self.registry
            .with_active(core, |a| self.apply(core, a, index))
    }

    /// Moves `core` one step toward its minimum frequency.
    ///
    /// A no-op returning `Ok(false)` if already at the minimum.
    pub fn step_down(&self, core: CoreId) -> Result<bool> {
        self.registry.with_active(core, |a| {
            let min_index = a.catalog.min_index();
            if a.index >= min_index {
                tracing::debug!("core {core}: step down clamped at minimum (index {min_index})");
                return Ok(false);
            }
            self.apply(core, a, a.index + 1)
        })
    }

    /// Moves `core` one step toward its maximum frequency.
    ///
    /// A no-op returning `Ok(false)` if already at the maximum.
    pub fn step_up(&self, core: CoreId) -> Result<bool> {
        self.registry.with_active(core, |a| {
            if a.index == 0 {
                tracing::debug!("core {core}: step up clamped at maximum (index 0)");
                return Ok(false);
            }
            self.apply(core, a, a.index - 1)
        })
    }

    /// Runs `core` at its maximum frequency.
    pub fn set_max(&self, core: CoreId) -> Result<bool> {
        self.set_index(core, 0)
    }

    /// Runs `core` at its minimum frequency.
    pub fn set_min(&self, core: CoreId) -> Result<bool> {
        self.registry
            .with_active(core, |a| self.apply(core, a, a.catalog.min_index()))
    }

    /// Deactivates every active core.
    ///
    /// Attempts all of them even if some fail, then returns the first error.
    pub fn shutdown(&self) -> Result<()> {
        let mut first_err = None;
        for core in self.registry.active_cores() {
            if let Err(e) = self.deactivate(core) {
                tracing::warn!("core {core}: deactivation failed during shutdown: {e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Writes `catalog[index]` through the bridge, then records `index`.
    fn apply(&self, core: CoreId, active: &mut ActiveCore, index: usize) -> Result<bool> {
        let khz = active.catalog.get(index).ok_or(PowerError::InvalidIndex {
            core,
            index,
            len: active.catalog.len(),
        })?;

        self.bridge.write_target_frequency(core, khz)?;

        let changed = active.index != index;
        tracing::debug!(
            "core {core}: frequency index {} -> {index} ({khz} kHz)",
            active.index
        );
        active.index = index;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BridgeOp, MemoryBridge};
    use std::sync::Arc;

    const FREQS: [u32; 4] = [2_400_000, 2_000_000, 1_600_000, 1_200_000];

    fn manager() -> (PowerManager<Arc<MemoryBridge>>, Arc<MemoryBridge>) {
        let bridge = Arc::new(MemoryBridge::new(8));
        bridge.add_core(2, "ondemand", &FREQS, 2_000_000);
        let power = PowerManager::new(Arc::clone(&bridge), 8);
        power.activate(2).unwrap();
        (power, bridge)
    }

    #[test]
    fn test_set_index() {
        let (power, bridge) = manager();
        assert!(power.set_index(2, 3).unwrap());
        assert_eq!(power.current_index(2).unwrap(), 3);
        assert_eq!(bridge.current_khz(2), Some(1_200_000));
    }

    #[test]
    fn test_set_index_same_still_writes() {
        let (power, bridge) = manager();
        assert_eq!(power.current_index(2).unwrap(), 1);
        assert!(!power.set_index(2, 1).unwrap());
        assert_eq!(bridge.target_writes(2), vec![2_000_000]);
    }

    #[test]
    fn test_set_index_out_of_range() {
        let (power, bridge) = manager();
        let err = power.set_index(2, 4).unwrap_err();
        assert!(matches!(
            err,
            PowerError::InvalidIndex {
                core: 2,
                index: 4,
                len: 4
            }
        ));
        assert_eq!(power.current_index(2).unwrap(), 1);
        assert!(bridge.target_writes(2).is_empty());
    }

    #[test]
    fn test_bridge_failure_keeps_index() {
        let (power, bridge) = manager();
        bridge.fail(2, BridgeOp::WriteTargetFrequency);

        assert!(matches!(
            power.set_max(2).unwrap_err(),
            PowerError::PowerIo(_)
        ));
        assert!(matches!(
            power.step_down(2).unwrap_err(),
            PowerError::PowerIo(_)
        ));
        assert_eq!(power.current_index(2).unwrap(), 1);
        assert_eq!(bridge.current_khz(2), Some(2_000_000));
    }

    #[test]
    fn test_step_clamps() {
        let (power, bridge) = manager();
        power.set_max(2).unwrap();
        assert!(!power.step_up(2).unwrap());
        assert_eq!(power.current_index(2).unwrap(), 0);

        power.set_min(2).unwrap();
        assert!(!power.step_down(2).unwrap());
        assert_eq!(power.current_index(2).unwrap(), 3);

        // Clamped steps never reach the bridge.
        assert_eq!(bridge.target_writes(2), vec![2_400_000, 1_200_000]);
    }

    #[test]
    fn test_step_moves_one() {
        let (power, _bridge) = manager();
        power.set_min(2).unwrap();
        assert!(power.step_up(2).unwrap());
        assert_eq!(power.current_index(2).unwrap(), 2);

        power.set_max(2).unwrap();
        assert!(power.step_down(2).unwrap());
        assert_eq!(power.current_index(2).unwrap(), 1);
        assert_eq!(power.current_frequency(2).unwrap(), 2_000_000);
    }

    #[test]
    fn test_not_active() {
        let (power, _bridge) = manager();
        power.deactivate(2).unwrap();

        assert!(matches!(power.current_index(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.list_frequencies(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.set_index(2, 0), Err(PowerError::NotActive(2))));
        assert!(matches!(power.step_up(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.step_down(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.set_max(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.set_min(2), Err(PowerError::NotActive(2))));
        assert!(matches!(power.status(2), Err(PowerError::NotActive(2))));
    }

    #[test]
    fn test_invalid_core() {
        let (power, _bridge) = manager();
        assert!(matches!(
            power.step_up(8),
            Err(PowerError::InvalidCore { core: 8, .. })
        ));
        assert!(matches!(
            power.current_index(usize::MAX),
            Err(PowerError::InvalidCore { .. })
        ));
    }

    #[test]
    fn test_single_frequency_catalog() {
        let bridge = MemoryBridge::new(1);
        bridge.add_core(0, "performance", &[3_000_000], 3_000_000);
        let power = PowerManager::new(bridge, 1);
        power.activate(0).unwrap();

        assert!(!power.step_up(0).unwrap());
        assert!(!power.step_down(0).unwrap());
        power.set_min(0).unwrap();
        assert_eq!(power.current_index(0).unwrap(), 0);
    }

    #[test]
    fn test_status_and_shutdown() {
        let (power, bridge) = manager();
        bridge.add_core(5, "schedutil", &FREQS, 1_200_000);
        power.activate(5).unwrap();

        let status = power.status(5).unwrap();
        assert_eq!(status.index, 3);
        assert_eq!(status.saved_governor, "schedutil");
        assert_eq!(power.list_frequencies(5).unwrap(), FREQS.to_vec());

        power.shutdown().unwrap();
        assert!(power.active_cores().is_empty());
        assert_eq!(bridge.governor(2).as_deref(), Some("ondemand"));
        assert_eq!(bridge.governor(5).as_deref(), Some("schedutil"));
    }

    #[test]
    fn test_shutdown_reports_failure_but_continues() {
        let (power, bridge) = manager();
        bridge.add_core(3, "ondemand", &FREQS, 1_200_000);
        power.activate(3).unwrap();
        bridge.fail(2, BridgeOp::WriteGovernor);

        assert!(matches!(power.shutdown(), Err(PowerError::PowerIo(_))));
        assert_eq!(power.active_cores(), vec![2]);
    }
}
