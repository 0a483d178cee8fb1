//! In-memory dataset store
//!
//! One [`Dataset`] per gathered category plus the flat unit list. A store is
//! always built whole from one decoded score file and replaced whole on the
//! next load; only severity ranks change in place.

use crate::category::{Category, GATHER_COUNT};
use crate::codec::ScoreData;
use crate::record::{AggregateValue, UnitRecord};
use std::collections::HashMap;

/// Aggregates of one category
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    values: Vec<AggregateValue>,
    /// Name to position in `values`
    lookup: HashMap<String, usize>,
    normalized_thresholds: Vec<u32>,
}

impl Dataset {
    /// Build from entries in file order
    ///
    /// Duplicate names stay in `values`; the lookup resolves to the last one.
    pub fn new(values: Vec<AggregateValue>) -> Self {
        let lookup = values
            .iter()
            .enumerate()
            .map(|(i, value)| (value.name().to_string(), i))
            .collect();

        Self {
            values,
            lookup,
            normalized_thresholds: Vec::new(),
        }
    }

    pub fn values(&self) -> &[AggregateValue] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [AggregateValue] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AggregateValue> {
        self.values.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&AggregateValue> {
        self.lookup.get(name).and_then(|&i| self.values.get(i))
    }

    /// `max` of every entry, in file order
    pub fn maxima(&self) -> Vec<u32> {
        self.values.iter().map(AggregateValue::max).collect()
    }

    /// Data-driven bucket boundaries; empty unless this category seeds them
    pub fn normalized_thresholds(&self) -> &[u32] {
        &self.normalized_thresholds
    }

    pub(crate) fn set_normalized_thresholds(&mut self, thresholds: Vec<u32>) {
        self.normalized_thresholds = thresholds;
    }
}

/// All datasets and units from one score file
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    datasets: [Dataset; GATHER_COUNT],
    units: Vec<UnitRecord>,
}

impl DatasetStore {
    /// Index freshly decoded data
    pub fn build(data: ScoreData) -> Self {
        let ScoreData { units, aggregates } = data;
        Self {
            datasets: aggregates.map(Dataset::new),
            units,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.datasets.iter().all(Dataset::is_empty)
    }

    /// Dataset for a gathered category
    pub fn dataset(&self, category: Category) -> Option<&Dataset> {
        self.datasets.get(category.index())
    }

    pub(crate) fn dataset_mut(&mut self, category: Category) -> Option<&mut Dataset> {
        self.datasets.get_mut(category.index())
    }

    /// Gathered categories paired with their datasets
    pub fn datasets(&self) -> impl Iterator<Item = (Category, &Dataset)> {
        Category::gathered().zip(self.datasets.iter())
    }

    pub fn aggregate_by_name(&self, category: Category, name: &str) -> Option<&AggregateValue> {
        self.dataset(category)?.find(name)
    }

    pub fn aggregate_at(&self, category: Category, index: usize) -> Option<&AggregateValue> {
        self.dataset(category)?.get(index)
    }

    pub fn units(&self) -> &[UnitRecord] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&UnitRecord> {
        self.units.get(index)
    }

    /// Aggregate entries across every category
    pub fn total_entries(&self) -> usize {
        self.datasets.iter().map(Dataset::len).sum()
    }
}

/// Categories whose maxima seed normalized thresholds
///
/// Only `Include` is seeded by default; the remaining categories classify
/// against the `Include` boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationScope {
    categories: Vec<Category>,
}

impl Default for NormalizationScope {
    fn default() -> Self {
        Self {
            categories: vec![Category::Include],
        }
    }
}

impl NormalizationScope {
    /// Scope over the given categories; non-gathered ones are ignored
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut categories: Vec<Category> =
            categories.into_iter().filter(|c| c.is_gathered()).collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    /// Seed every gathered category from its own data
    pub fn all_gathered() -> Self {
        Self::new(Category::gathered())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}
