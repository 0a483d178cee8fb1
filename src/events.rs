//! Data-changed notifications
//!
//! Listeners run synchronously on the thread that publishes, in the order
//! they subscribed. Every listener sees the store only after it has been
//! fully replaced or reclassified.

use crate::dataset::DatasetStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the published data changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// A score file was decoded and installed
    Reloaded,
    /// No score file exists; the store is empty
    Cleared,
    /// Decoding failed; the store is empty
    LoadFailed,
    /// Ranks were recomputed without touching the store
    SeveritiesRecomputed,
}

/// Published after every store replacement or reclassification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChanged {
    /// Increments on every store replacement
    pub generation: u64,
    pub cause: ChangeCause,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&DataChanged, &DatasetStore)>;

/// Ordered list of data-changed listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, invoked after all earlier registrations
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&DataChanged, &DatasetStore) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if `id` was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver `event` and the current store to every listener
    pub fn publish(&mut self, event: &DataChanged, store: &DatasetStore) {
        tracing::debug!(
            "Publishing {:?} (generation {}) to {} listener(s)",
            event.cause,
            event.generation,
            self.listeners.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, store);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
