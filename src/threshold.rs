//! Severity bucket boundaries
//!
//! Boundaries come from one of two sources:
//! - normalized: derived from the loaded data, recomputed on every load
//! - user-defined: supplied by settings and used as-is
//!
//! Switching between them, or editing the user-defined list, only needs a
//! reclassification pass over the current store.

use crate::category::Category;
use crate::dataset::{DatasetStore, NormalizationScope};
use serde::{Deserialize, Serialize};

/// Number of severity buckets produced by normalization
pub const SEVERITY_BUCKETS: usize = 5;

/// Category whose normalized boundaries apply to categories without their own
pub const PRIMARY_CATEGORY: Category = Category::Include;

/// Where the classifier takes its boundaries from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Boundaries derived from the data's own distribution
    #[default]
    Normalized,
    /// Ascending boundaries supplied externally
    UserDefined(Vec<u32>),
}

impl ThresholdPolicy {
    /// Boundaries used for `category` under this policy
    pub fn thresholds_for<'a>(&'a self, store: &'a DatasetStore, category: Category) -> &'a [u32] {
        match self {
            ThresholdPolicy::UserDefined(thresholds) => thresholds,
            ThresholdPolicy::Normalized => {
                let own = store
                    .dataset(category)
                    .map(|d| d.normalized_thresholds())
                    .unwrap_or(&[]);
                if own.is_empty() {
                    store
                        .dataset(PRIMARY_CATEGORY)
                        .map(|d| d.normalized_thresholds())
                        .unwrap_or(&[])
                } else {
                    own
                }
            }
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, ThresholdPolicy::Normalized)
    }
}

/// Compute normalized boundaries from a set of maxima
///
/// Sorts the values, splits them into [`SEVERITY_BUCKETS`] equal spans (span
/// rounded to nearest) and takes the value at every span multiple as a
/// boundary. Positions past the end resolve to `u32::MAX`, so the result
/// always has exactly [`SEVERITY_BUCKETS`] non-decreasing entries.
pub fn normalized_thresholds(maxima: &[u32]) -> Vec<u32> {
    let mut sorted = maxima.to_vec();
    sorted.sort_unstable();

    let span = (sorted.len() + SEVERITY_BUCKETS / 2) / SEVERITY_BUCKETS;

    (1..=SEVERITY_BUCKETS)
        .map(|bucket| sorted.get(bucket * span).copied().unwrap_or(u32::MAX))
        .collect()
}

/// Recompute normalized boundaries for every category in `scope`
///
/// Categories outside the scope are left without boundaries of their own.
pub fn apply_normalized(store: &mut DatasetStore, scope: &NormalizationScope) {
    for category in Category::gathered() {
        if let Some(dataset) = store.dataset_mut(category) {
            let thresholds = if scope.contains(category) {
                normalized_thresholds(&dataset.maxima())
            } else {
                Vec::new()
            };
            dataset.set_normalized_thresholds(thresholds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ScoreData;
    use crate::record::AggregateValue;

    #[test]
    fn test_hundred_evenly_spaced() {
        let maxima: Vec<u32> = (1..=100).collect();
        let thresholds = normalized_thresholds(&maxima);
        assert_eq!(thresholds, vec![21, 41, 61, 81, u32::MAX]);
    }

    #[test]
    fn test_unsorted_input() {
        let maxima: Vec<u32> = (1..=100).rev().collect();
        assert_eq!(normalized_thresholds(&maxima), vec![21, 41, 61, 81, u32::MAX]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalized_thresholds(&[]), vec![u32::MAX; SEVERITY_BUCKETS]);
    }

    #[test]
    fn test_tiny_input_repeats_smallest() {
        // span rounds to 0 below three values
        assert_eq!(normalized_thresholds(&[40, 7]), vec![7; SEVERITY_BUCKETS]);
        assert_eq!(normalized_thresholds(&[9]), vec![9; SEVERITY_BUCKETS]);
    }

    #[test]
    fn test_span_rounds_to_nearest() {
        // 8 / 5 = 1.6 -> span 2
        let maxima: Vec<u32> = (10..18).collect();
        assert_eq!(
            normalized_thresholds(&maxima),
            vec![12, 14, 16, u32::MAX, u32::MAX]
        );

        // 7 / 5 = 1.4 -> span 1
        let maxima: Vec<u32> = (10..17).collect();
        assert_eq!(normalized_thresholds(&maxima), vec![11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_always_five_ascending() {
        for len in 0..60u32 {
            let maxima: Vec<u32> = (0..len).map(|i| (i * 37) % 101).collect();
            let thresholds = normalized_thresholds(&maxima);
            assert_eq!(thresholds.len(), SEVERITY_BUCKETS);
            assert!(thresholds.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    fn store_with(include: &[u32], other: &[u32]) -> DatasetStore {
        let mut data = ScoreData::default();
        data.aggregates[Category::Include.index()] = include
            .iter()
            .map(|&m| AggregateValue::new("i", u64::from(m), m, m, 1))
            .collect();
        data.aggregates[Category::Other.index()] = other
            .iter()
            .map(|&m| AggregateValue::new("o", u64::from(m), m, m, 1))
            .collect();
        DatasetStore::build(data)
    }

    #[test]
    fn test_default_scope_seeds_include_only() {
        let mut store = store_with(&[1, 2, 3, 4, 5], &[100, 200, 300, 400, 500]);
        apply_normalized(&mut store, &NormalizationScope::default());

        let include = store.dataset(Category::Include).unwrap();
        assert_eq!(include.normalized_thresholds(), &[2, 3, 4, 5, u32::MAX]);
        assert!(store
            .dataset(Category::Other)
            .unwrap()
            .normalized_thresholds()
            .is_empty());

        let policy = ThresholdPolicy::Normalized;
        assert_eq!(
            policy.thresholds_for(&store, Category::Other),
            &[2, 3, 4, 5, u32::MAX]
        );
    }

    #[test]
    fn test_wider_scope_uses_own_boundaries() {
        let mut store = store_with(&[1, 2, 3, 4, 5], &[100, 200, 300, 400, 500]);
        apply_normalized(
            &mut store,
            &NormalizationScope::new([Category::Include, Category::Other]),
        );

        let policy = ThresholdPolicy::Normalized;
        assert_eq!(
            policy.thresholds_for(&store, Category::Other),
            &[200, 300, 400, 500, u32::MAX]
        );
    }

    #[test]
    fn test_user_defined_ignores_data() {
        let store = store_with(&[1, 2, 3], &[]);
        let policy = ThresholdPolicy::UserDefined(vec![10, 20]);
        assert_eq!(policy.thresholds_for(&store, Category::Include), &[10, 20]);
        assert!(!policy.is_normalized());
    }

    #[test]
    fn test_normalized_on_empty_store_has_no_boundaries() {
        let store = DatasetStore::default();
        assert!(ThresholdPolicy::Normalized
            .thresholds_for(&store, Category::Include)
            .is_empty());
    }
}
