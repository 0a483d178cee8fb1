//! CLI argument parsing for compile-score

use crate::category::Category;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "compile-score")]
#[command(version)]
#[command(about = "Classify compiler build-time costs from a score file", long_about = None)]
pub struct Cli {
    /// Score file to load (defaults to the location from settings)
    #[arg(value_name = "SCORE_FILE")]
    pub score_file: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the settings' score_directory is relative to
    #[arg(long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Category to report (e.g. include, parse_class, front_end)
    #[arg(short = 'C', long = "category", default_value = "include")]
    pub category: Category,

    /// Report translation units instead of aggregates
    #[arg(short = 'u', long = "units")]
    pub units: bool,

    /// Manual severity thresholds in microseconds, comma-separated (disables normalization)
    #[arg(long = "manual-thresholds", value_name = "US", value_delimiter = ',')]
    pub manual_thresholds: Option<Vec<u32>>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only show the N most expensive entries
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Show the timeline of the unit at this index instead of a report
    #[arg(long = "timeline", value_name = "UNIT")]
    pub timeline: Option<usize>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
