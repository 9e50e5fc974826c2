// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The per-core frequency catalog.
//!
//! A [`FrequencyCatalog`] is captured once when a core is activated and is
//! immutable afterwards. Entries are strictly descending, so index `0` is
//! the maximum frequency and `len() - 1` the minimum.

use crate::{CoreId, PowerError};

/// Supported frequencies of one core in kHz, highest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FrequencyCatalog {
    frequencies: Vec<u32>,
}

impl FrequencyCatalog {
    /// Builds a catalog from the list the OS reported for `core`.
    ///
    /// The list is sorted descending and deduplicated; zero entries are
    /// dropped. Fails with [`PowerError::NoFrequenciesAvailable`] if nothing
    /// remains and [`PowerError::TooManyFrequencies`] if more than
    /// `max_len` distinct frequencies remain.
    pub fn from_reported(
        core: CoreId,
        mut reported: Vec<u32>,
        max_len: usize,
    ) -> Result<Self, PowerError> {
        reported.retain(|&khz| khz > 0);
        reported.sort_unstable_by(|a, b| b.cmp(a));
        reported.dedup();

        if reported.is_empty() {
            return Err(PowerError::NoFrequenciesAvailable(core));
        }
        if reported.len() > max_len {
            return Err(PowerError::TooManyFrequencies {
                core,
                count: reported.len(),
                max: max_len,
            });
        }
        Ok(Self {
            frequencies: reported,
        })
    }

    /// Number of frequencies. Always at least 1.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always `false`; a catalog cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.frequencies.get(index).copied()
    }

    /// Index of the minimum frequency.
    pub fn min_index(&self) -> usize {
        self.frequencies.len() - 1
    }

    /// Highest supported frequency.
    pub fn max_khz(&self) -> u32 {
        self.frequencies[0]
    }

    /// Lowest supported frequency.
    pub fn min_khz(&self) -> u32 {
        self.frequencies[self.min_index()]
    }

    /// Frequencies, highest first.
    pub fn as_slice(&self) -> &[u32] {
        &self.frequencies
    }

    /// Best-effort index for a frequency reported by the OS.
    ///
    /// Returns the exact match when there is one, otherwise the entry
    /// closest to `khz`. Ties resolve to the higher frequency (lower index).
    pub fn index_of(&self, khz: u32) -> usize {
        self.frequencies
            .iter()
            .enumerate()
            .min_by_key(|&(i, &f)| (f.abs_diff(khz), i))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(freqs: &[u32]) -> FrequencyCatalog {
        FrequencyCatalog::from_reported(0, freqs.to_vec(), 64).unwrap()
    }

    #[test]
    fn test_sorted_descending_and_deduplicated() {
        let c = catalog(&[1_200_000, 2_400_000, 1_600_000, 2_400_000, 2_000_000]);
        assert_eq!(c.as_slice(), &[2_400_000, 2_000_000, 1_600_000, 1_200_000]);
        assert_eq!(c.len(), 4);
        assert_eq!(c.max_khz(), 2_400_000);
        assert_eq!(c.min_khz(), 1_200_000);
        assert_eq!(c.min_index(), 3);
        assert!(!c.is_empty());
    }

    #[test]
    fn test_empty_fails() {
        let err = FrequencyCatalog::from_reported(5, vec![], 64).unwrap_err();
        assert!(matches!(err, PowerError::NoFrequenciesAvailable(5)));

        let err = FrequencyCatalog::from_reported(5, vec![0, 0], 64).unwrap_err();
        assert!(matches!(err, PowerError::NoFrequenciesAvailable(5)));
    }

    #[test]
    fn test_too_many_fails() {
        let freqs: Vec<u32> = (1..=5).map(|i| i * 100_000).collect();
        let err = FrequencyCatalog::from_reported(1, freqs.clone(), 4).unwrap_err();
        assert!(matches!(
            err,
            PowerError::TooManyFrequencies {
                core: 1,
                count: 5,
                max: 4
            }
        ));
        assert!(FrequencyCatalog::from_reported(1, freqs, 5).is_ok());
    }

    #[test]
    fn test_single_entry() {
        let c = catalog(&[1_000_000]);
        assert_eq!(c.min_index(), 0);
        assert_eq!(c.max_khz(), c.min_khz());
    }

    #[test]
    fn test_index_of_exact() {
        let c = catalog(&[2_400_000, 2_000_000, 1_600_000, 1_200_000]);
        assert_eq!(c.index_of(2_400_000), 0);
        assert_eq!(c.index_of(1_600_000), 2);
        assert_eq!(c.index_of(1_200_000), 3);
    }

    #[test]
    fn test_index_of_nearest() {
        let c = catalog(&[2_400_000, 2_000_000, 1_600_000, 1_200_000]);
        assert_eq!(c.index_of(1_950_000), 1);
        assert_eq!(c.index_of(3_000_000), 0);
        assert_eq!(c.index_of(800_000), 3);
        // Equidistant: prefer the higher frequency.
        assert_eq!(c.index_of(1_800_000), 1);
    }

    #[test]
    fn test_get() {
        let c = catalog(&[2_000_000, 1_000_000]);
        assert_eq!(c.get(1), Some(1_000_000));
        assert_eq!(c.get(2), None);
    }
}
