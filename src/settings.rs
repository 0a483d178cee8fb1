//! User settings
//!
//! Where the score file lives and how severities are assigned. Read from a
//! TOML file:
//!
//! ```toml
//! score_directory = "build/score"
//! score_file_name = "compileData.scor"
//! normalized_severity = false
//! severities = [1000, 10000, 50000, 250000, 1000000]
//! normalize_categories = ["include"]
//! ```
//!
//! Every key is optional.

use crate::category::Category;
use crate::dataset::NormalizationScope;
use crate::threshold::ThresholdPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default score file name written by the extractor
pub const DEFAULT_SCORE_FILE_NAME: &str = "compileData.scor";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings format: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Settings consumed by the orchestrator; never written back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the score file, relative to the base directory
    pub score_directory: PathBuf,

    /// Score file name inside `score_directory`
    pub score_file_name: String,

    /// Use data-driven boundaries instead of `severities`
    pub normalized_severity: bool,

    /// Ascending manual boundaries, in microseconds
    pub severities: Vec<u32>,

    /// Categories whose own data seeds normalized boundaries
    pub normalize_categories: Vec<Category>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            score_directory: PathBuf::new(),
            score_file_name: DEFAULT_SCORE_FILE_NAME.to_string(),
            normalized_severity: true,
            severities: vec![1_000, 10_000, 50_000, 250_000, 1_000_000],
            normalize_categories: vec![Category::Include],
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate().map_err(SettingsError::Invalid)?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), String> {
        if self.score_file_name.trim().is_empty() {
            return Err("score_file_name must not be empty".to_string());
        }

        if self.severities.is_empty() {
            return Err("severities must contain at least one boundary".to_string());
        }

        if self.severities.windows(2).any(|w| w[0] > w[1]) {
            return Err(format!(
                "severities must be ascending, got {:?}",
                self.severities
            ));
        }

        if let Some(category) = self.normalize_categories.iter().find(|c| !c.is_gathered()) {
            return Err(format!(
                "normalize_categories: '{}' has no aggregate data",
                category
            ));
        }

        Ok(())
    }

    /// Absolute score file location under `base_dir`
    pub fn score_path(&self, base_dir: impl AsRef<Path>) -> PathBuf {
        base_dir
            .as_ref()
            .join(&self.score_directory)
            .join(&self.score_file_name)
    }

    /// Threshold source selected by these settings
    pub fn threshold_policy(&self) -> ThresholdPolicy {
        if self.normalized_severity {
            ThresholdPolicy::Normalized
        } else {
            ThresholdPolicy::UserDefined(self.severities.clone())
        }
    }

    pub fn normalization_scope(&self) -> NormalizationScope {
        NormalizationScope::new(self.normalize_categories.iter().copied())
    }
}
