// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Point-in-time view of an active core.

use crate::registry::ActiveCore;
use crate::CoreId;

/// Snapshot of a core under power control.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CoreStatus {
    /// Core id.
    pub core: CoreId,
    /// Current frequency index (0 = maximum).
    pub index: usize,
    /// Frequency at `index`, in kHz.
    pub frequency_khz: u32,
    /// Catalog, highest first, in kHz.
    pub frequencies: Vec<u32>,
    /// Governor that will be restored on deactivation.
    pub saved_governor: String,
}

impl CoreStatus {
    pub(crate) fn from_active(core: CoreId, active: &ActiveCore) -> Self {
        let frequencies = active.catalog.as_slice().to_vec();
        Self {
            core,
            index: active.index,
            frequency_khz: frequencies[active.index],
            frequencies,
            saved_governor: active.saved_governor.clone(),
        }
    }

    /// `true` when running at the highest catalog frequency.
    pub fn at_max(&self) -> bool {
        self.index == 0
    }

    /// `true` when running at the lowest catalog frequency.
    pub fn at_min(&self) -> bool {
        self.index + 1 == self.frequencies.len()
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "core {}: {} MHz (index {}/{}), restores '{}'",
            self.core,
            self.frequency_khz / 1000,
            self.index,
            self.frequencies.len() - 1,
            self.saved_governor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FrequencyCatalog;

    fn status(index: usize) -> CoreStatus {
        let active = ActiveCore {
            catalog: FrequencyCatalog::from_reported(3, vec![1_800_000, 1_500_000, 600_000], 64)
                .unwrap(),
            saved_governor: "ondemand".into(),
            index,
        };
        CoreStatus::from_active(3, &active)
    }

    #[test]
    fn test_from_active() {
        let s = status(1);
        assert_eq!(s.core, 3);
        assert_eq!(s.frequency_khz, 1_500_000);
        assert_eq!(s.frequencies.len(), 3);
        assert!(!s.at_max());
        assert!(!s.at_min());
    }

    #[test]
    fn test_bounds() {
        assert!(status(0).at_max());
        assert!(status(2).at_min());
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            status(2).summary(),
            "core 3: 600 MHz (index 2/2), restores 'ondemand'"
        );
    }

    #[test]
    fn test_serialises() {
        let json = serde_json::to_value(status(0)).unwrap();
        assert_eq!(json["frequency_khz"], 1_800_000);
        assert_eq!(json["saved_governor"], "ondemand");
    }
}
