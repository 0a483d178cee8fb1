//! Score data lifecycle
//!
//! The [`Orchestrator`] is the only owner and the only writer of the
//! [`DatasetStore`]. It decodes score files, installs each new generation
//! whole, keeps severity ranks current with the active [`ThresholdPolicy`]
//! and notifies subscribers after every change.
//!
//! All calls are expected on a single owning thread. Hosts that watch the
//! score file or settings marshal those triggers onto that thread and call
//! [`Orchestrator::reload`] or [`Orchestrator::recompute_severities`].
//!
//! ```text
//!   Empty ──reload──▶ Loading ──ok / missing file──▶ Ready ◀──recompute── Stale
//!     ▲                  │                             │                    ▲
//!     └──decode error────┘                             └─────set_policy─────┘
//! ```

use crate::category::Category;
use crate::codec::{self, DecodeError};
use crate::dataset::{DatasetStore, NormalizationScope};
use crate::events::{ChangeCause, DataChanged, EventBus, SubscriptionId};
use crate::record::{AggregateValue, UnitRecord};
use crate::report::format_duration_us;
use crate::settings::Settings;
use crate::severity::classify_store;
use crate::threshold::{apply_normalized, ThresholdPolicy};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

/// A score file could not be loaded; the store has been cleared
#[derive(Error, Debug)]
#[error("Failed to load score file {}: {source}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: DecodeError,
}

impl LoadError {
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self.source, DecodeError::VersionMismatch { .. })
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// No data loaded, or the last load failed
    Empty,
    /// A decode is in progress
    Loading,
    /// Data available and ranks current
    Ready,
    /// Data available, ranks out of date with the policy
    Stale,
}

/// What [`Orchestrator::apply_settings`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    /// Score file location changed and was reloaded
    Reloaded,
    /// Only the classification policy changed
    Recomputed,
    Unchanged,
}

#[derive(Debug)]
pub struct Orchestrator {
    store: DatasetStore,
    policy: ThresholdPolicy,
    scope: NormalizationScope,
    state: OrchestratorState,
    generation: u64,
    current_path: Option<PathBuf>,
    events: EventBus,
}

impl Orchestrator {
    /// Create an orchestrator with no data loaded
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self {
            store: DatasetStore::default(),
            policy,
            scope: NormalizationScope::default(),
            state: OrchestratorState::Empty,
            generation: 0,
            current_path: None,
            events: EventBus::new(),
        }
    }

    /// Create an orchestrator configured from `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.threshold_policy()).with_scope(settings.normalization_scope())
    }

    /// Replace the set of categories seeding normalized thresholds
    pub fn with_scope(mut self, scope: NormalizationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    pub fn scope(&self) -> &NormalizationScope {
        &self.scope
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Store generation, incremented on every replacement
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Path passed to the last [`reload`](Self::reload)
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn aggregate_by_name(&self, category: Category, name: &str) -> Option<&AggregateValue> {
        self.store.aggregate_by_name(category, name)
    }

    pub fn aggregate_at(&self, category: Category, index: usize) -> Option<&AggregateValue> {
        self.store.aggregate_at(category, index)
    }

    pub fn unit(&self, index: usize) -> Option<&UnitRecord> {
        self.store.unit(index)
    }

    /// Register a data-changed listener
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DataChanged, &DatasetStore) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Load the score file at `path`, replacing the current store
    ///
    /// A missing file, or a path that is not a regular file, is not an error:
    /// the store is cleared and subscribers are notified. Any decode failure also clears the store, moves to
    /// [`OrchestratorState::Empty`] and is returned as a [`LoadError`].
    /// Subscribers are notified exactly once in every case.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.state = OrchestratorState::Loading;
        self.current_path = Some(path.to_path_buf());

        // The previous generation is never kept past a reload
        self.store = DatasetStore::default();
        self.generation += 1;

        // Only a regular file holds data; a directory counts as no data yet
        if !path.is_file() {
            self.clear_missing(path);
            return Ok(());
        }

        let start = Instant::now();
        match codec::decode_file(path) {
            Ok(data) => {
                let mut store = DatasetStore::build(data);
                apply_normalized(&mut store, &self.scope);
                classify_store(&mut store, &self.policy);
                self.store = store;

                let elapsed_us = start.elapsed().as_micros() as u64;
                info!(
                    "Score file processed in {} ({} units, {} aggregates): {}",
                    format_duration_us(elapsed_us),
                    self.store.units().len(),
                    self.store.total_entries(),
                    path.display()
                );

                self.finish(ChangeCause::Reloaded, OrchestratorState::Ready);
                Ok(())
            }
            Err(DecodeError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                self.clear_missing(path);
                Ok(())
            }
            Err(source) => {
                match &source {
                    DecodeError::VersionMismatch { expected, found } => {
                        error!("Version mismatch! Expected {} - Found {}", expected, found)
                    }
                    other => error!("Unable to read score file {}: {}", path.display(), other),
                }

                self.finish(ChangeCause::LoadFailed, OrchestratorState::Empty);
                Err(LoadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Reload the last loaded path, if any
    pub fn reload_current(&mut self) -> Option<Result<(), LoadError>> {
        let path = self.current_path.clone()?;
        Some(self.reload(path))
    }

    /// Adopt `policy` and re-rank the current store without reloading
    ///
    /// With no data loaded the policy is stored for the next load and no
    /// notification is sent.
    pub fn recompute_severities(&mut self, policy: ThresholdPolicy) {
        self.policy = policy;
        self.refresh();
    }

    /// Re-rank with the current policy, bringing a stale store up to date
    pub fn refresh(&mut self) {
        if self.state == OrchestratorState::Empty {
            debug!("No score data loaded; severity recompute deferred");
            return;
        }

        classify_store(&mut self.store, &self.policy);
        self.finish(ChangeCause::SeveritiesRecomputed, OrchestratorState::Ready);
    }

    /// Adopt `policy` without re-ranking; the store becomes stale
    pub fn set_policy(&mut self, policy: ThresholdPolicy) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        if self.state == OrchestratorState::Ready {
            self.state = OrchestratorState::Stale;
        }
    }

    /// React to a settings change
    ///
    /// A different score file location triggers a reload; a different
    /// policy or normalization scope only re-ranks the current store.
    pub fn apply_settings(
        &mut self,
        settings: &Settings,
        base_dir: impl AsRef<Path>,
    ) -> Result<SettingsChange, LoadError> {
        let path = settings.score_path(base_dir);
        let policy = settings.threshold_policy();
        let scope = settings.normalization_scope();

        if self.current_path.as_deref() != Some(path.as_path()) {
            info!("Settings - Score File: {}", path.display());
            self.policy = policy;
            self.scope = scope;
            self.reload(&path)?;
            return Ok(SettingsChange::Reloaded);
        }

        if policy == self.policy && scope == self.scope {
            return Ok(SettingsChange::Unchanged);
        }

        if scope != self.scope {
            self.scope = scope;
            apply_normalized(&mut self.store, &self.scope);
        }
        self.recompute_severities(policy);
        Ok(SettingsChange::Recomputed)
    }

    fn clear_missing(&mut self, path: &Path) {
        info!("No score file at {}", path.display());
        apply_normalized(&mut self.store, &self.scope);
        classify_store(&mut self.store, &self.policy);
        self.finish(ChangeCause::Cleared, OrchestratorState::Ready);
    }

    fn finish(&mut self, cause: ChangeCause, state: OrchestratorState) {
        self.state = state;
        let event = DataChanged {
            generation: self.generation,
            cause,
        };
        self.events.publish(&event, &self.store);
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(ThresholdPolicy::default())
    }
}
