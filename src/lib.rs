//! compile-score - reader and severity classifier for compiler build-time data
//!
//! Decodes the score file written by the compile data extractor into typed
//! datasets, derives severity thresholds from the data (or takes them from
//! settings) and ranks every measured entity for heat-map style views.
//!
//! The [`orchestrator::Orchestrator`] owns the loaded data and is the single
//! entry point for reloading and reclassifying it.

pub mod category;
pub mod cli;
pub mod codec;
pub mod dataset;
pub mod events;
pub mod orchestrator;
pub mod record;
pub mod report;
pub mod settings;
pub mod severity;
pub mod threshold;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testing;
