//! Severity classification
//!
//! Ranks are 1-based: a value below the first boundary is rank 1, a value at
//! or above every boundary gets the highest rank.

use crate::category::Category;
use crate::dataset::DatasetStore;
use crate::threshold::ThresholdPolicy;
use serde::Serialize;

/// Rank of `value` against ascending `boundaries`
///
/// Returns the smallest 1-based `i` with `value < boundaries[i - 1]`, or
/// `boundaries.len()` if no boundary exceeds the value. An empty boundary list
/// yields 0 (unclassified).
pub fn classify(boundaries: &[u32], value: u32) -> u32 {
    let rank = boundaries
        .iter()
        .position(|&boundary| value < boundary)
        .map_or(boundaries.len(), |i| i + 1);
    rank as u32
}

/// Re-rank every aggregate of every gathered category in place
///
/// Ranks are computed from each entry's `max`.
pub fn classify_store(store: &mut DatasetStore, policy: &ThresholdPolicy) {
    for category in Category::gathered() {
        let boundaries = policy.thresholds_for(store, category).to_vec();
        if let Some(dataset) = store.dataset_mut(category) {
            for value in dataset.values_mut() {
                let rank = classify(&boundaries, value.max());
                value.set_severity(rank);
            }
        }
    }
}

/// Count of entries per severity rank for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityHistogram {
    /// `counts[r]` is the number of entries with rank `r`
    pub counts: Vec<usize>,
}

impl SeverityHistogram {
    pub fn from_store(store: &DatasetStore, category: Category) -> Self {
        let mut counts = Vec::new();
        if let Some(dataset) = store.dataset(category) {
            for value in dataset.values() {
                let rank = value.severity() as usize;
                if counts.len() <= rank {
                    counts.resize(rank + 1, 0);
                }
                counts[rank] += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, rank: u32) -> usize {
        self.counts.get(rank as usize).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
