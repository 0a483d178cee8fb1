//! Compile cost categories
//!
//! The enumeration order is part of the score file contract: unit records store
//! one value per displayable category and aggregate datasets are written for
//! each gathered category, both in index order. Keep it in sync with the
//! exporter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A cost dimension measured by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Category {
    Include = 0,
    ParseClass,
    ParseTemplate,
    InstanceClass,
    InstanceFunction,
    CodeGeneration,
    OptimizeModule,
    OptimizeFunction,
    Other,
    RunPass,
    PendingInstantiations,
    FrontEnd,
    BackEnd,
    ExecuteCompiler,
    Invalid,
}

/// Number of categories with an aggregate dataset in the score file
pub const GATHER_COUNT: usize = Category::RunPass as usize;

/// Number of per-category values stored in every unit record
pub const DISPLAY_COUNT: usize = Category::Invalid as usize;

/// Total number of enumerators
pub const FULL_COUNT: usize = Category::ALL.len();

const _: () = assert!(GATHER_COUNT <= DISPLAY_COUNT && DISPLAY_COUNT <= FULL_COUNT);

impl Category {
    /// Every category in index order
    pub const ALL: [Category; 15] = [
        Category::Include,
        Category::ParseClass,
        Category::ParseTemplate,
        Category::InstanceClass,
        Category::InstanceFunction,
        Category::CodeGeneration,
        Category::OptimizeModule,
        Category::OptimizeFunction,
        Category::Other,
        Category::RunPass,
        Category::PendingInstantiations,
        Category::FrontEnd,
        Category::BackEnd,
        Category::ExecuteCompiler,
        Category::Invalid,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Categories that carry an aggregate dataset
    pub fn gathered() -> impl Iterator<Item = Category> {
        Self::ALL[..GATHER_COUNT].iter().copied()
    }

    /// Categories stored per unit record
    pub fn displayed() -> impl Iterator<Item = Category> {
        Self::ALL[..DISPLAY_COUNT].iter().copied()
    }

    pub fn is_gathered(self) -> bool {
        self.index() < GATHER_COUNT
    }

    /// Human-readable label for reports
    pub fn label(self) -> &'static str {
        match self {
            Category::Include => "Include",
            Category::ParseClass => "Parse Class",
            Category::ParseTemplate => "Parse Template",
            Category::InstanceClass => "Instantiate Class",
            Category::InstanceFunction => "Instantiate Function",
            Category::CodeGeneration => "Code Generation",
            Category::OptimizeModule => "Optimize Module",
            Category::OptimizeFunction => "Optimize Function",
            Category::Other => "Other",
            Category::RunPass => "Run Pass",
            Category::PendingInstantiations => "Pending Instantiations",
            Category::FrontEnd => "Frontend",
            Category::BackEnd => "Backend",
            Category::ExecuteCompiler => "Execute Compiler",
            Category::Invalid => "Invalid",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Category::Include => "include",
            Category::ParseClass => "parse_class",
            Category::ParseTemplate => "parse_template",
            Category::InstanceClass => "instance_class",
            Category::InstanceFunction => "instance_function",
            Category::CodeGeneration => "code_generation",
            Category::OptimizeModule => "optimize_module",
            Category::OptimizeFunction => "optimize_function",
            Category::Other => "other",
            Category::RunPass => "run_pass",
            Category::PendingInstantiations => "pending_instantiations",
            Category::FrontEnd => "front_end",
            Category::BackEnd => "back_end",
            Category::ExecuteCompiler => "execute_compiler",
            Category::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts `parse_class`, `parse-class` and `ParseClass`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|category| category.key().replace('_', "") == normalized)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}
