//! Records decoded from a score file

use crate::category::{Category, DISPLAY_COUNT};
use serde::{Deserialize, Serialize};

/// One named cost aggregate, e.g. the total include cost of a header across
/// every translation unit that pulled it in.
///
/// All fields are fixed at decode time except `severity`, which is the only
/// mutable attribute and is written exclusively by the severity classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateValue {
    name: String,
    accumulated: u64,
    min: u32,
    max: u32,
    count: u32,
    severity: u32,
}

impl AggregateValue {
    pub fn new(name: impl Into<String>, accumulated: u64, min: u32, max: u32, count: u32) -> Self {
        Self {
            name: name.into(),
            accumulated,
            min,
            max,
            count,
            severity: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accumulated(&self) -> u64 {
        self.accumulated
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Integer mean of the accumulated value
    ///
    /// Returns `None` for an aggregate without samples.
    pub fn mean(&self) -> Option<u64> {
        if self.count == 0 {
            None
        } else {
            Some(self.accumulated / u64::from(self.count))
        }
    }

    /// Severity rank, 0 until classified
    pub fn severity(&self) -> u32 {
        self.severity
    }

    pub(crate) fn set_severity(&mut self, severity: u32) {
        self.severity = severity;
    }
}

/// One translation unit with a cost value per displayable category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    name: String,
    values: [u32; DISPLAY_COUNT],
}

impl UnitRecord {
    pub fn new(name: impl Into<String>, values: [u32; DISPLAY_COUNT]) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in category index order
    pub fn values(&self) -> &[u32; DISPLAY_COUNT] {
        &self.values
    }

    /// Cost for `category`, `None` for categories not stored per unit
    pub fn value(&self, category: Category) -> Option<u32> {
        self.values.get(category.index()).copied()
    }
}
