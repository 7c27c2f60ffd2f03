//! Tooth bands: the tick lists each comb tooth fires at

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-tooth onset ticks, tooth 0 first
///
/// Every band holds unique ticks in ascending order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ToothBands {
    bands: Vec<Vec<u64>>,
}

impl ToothBands {
    /// Build bands from unsorted tick lists, dropping duplicates
    pub fn from_ticks(mut bands: Vec<Vec<u64>>) -> Self {
        for band in &mut bands {
            band.sort_unstable();
            band.dedup();
        }
        Self { bands }
    }

    pub fn tooth_count(&self) -> usize {
        self.bands.len()
    }

    pub fn band(&self, tooth: usize) -> &[u64] {
        &self.bands[tooth]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u64])> {
        self.bands.iter().enumerate().map(|(tooth, ticks)| (tooth, ticks.as_slice()))
    }

    pub(crate) fn bands_mut(&mut self) -> &mut Vec<Vec<u64>> {
        &mut self.bands
    }

    /// Number of holes over all teeth
    pub fn hole_count(&self) -> usize {
        self.bands.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hole_count() == 0
    }

    /// Every distinct tick used by any tooth, ascending
    pub fn distinct_ticks(&self) -> Vec<u64> {
        let mut ticks: Vec<u64> = self.bands.iter().flatten().copied().collect();
        ticks.sort_unstable();
        ticks.dedup();
        ticks
    }

    /// How often each inter-onset interval occurs within a band
    pub fn interval_histogram(&self) -> BTreeMap<u64, usize> {
        let mut histogram = BTreeMap::new();
        for band in &self.bands {
            for pair in band.windows(2) {
                *histogram.entry(pair[1] - pair[0]).or_insert(0) += 1;
            }
        }
        histogram
    }

    /// Smallest positive interval between two onsets of the same tooth
    pub fn min_interval(&self) -> Option<u64> {
        self.interval_histogram().keys().copied().find(|d| *d > 0)
    }
}
