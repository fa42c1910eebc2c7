use std::sync::Arc;

use crate::io::storage::{NoEvents, Storage, StorageEventSource};
use crate::store::CollectionStore;
use crate::sync::bus::ChangeBus;

/// One execution context: a store handle, its change bus, and the medium's
/// signal for writes made elsewhere.
pub struct Context {
    store: CollectionStore,
    events: Box<dyn StorageEventSource>,
}

impl Context {
    pub fn new(storage: Arc<dyn Storage>, events: Box<dyn StorageEventSource>) -> Self {
        Context {
            store: CollectionStore::new(storage, ChangeBus::new()),
            events,
        }
    }

    /// A context that never hears from anyone else.
    pub fn isolated(storage: Arc<dyn Storage>) -> Self {
        Self::new(storage, Box::new(NoEvents))
    }

    pub fn with_seed_defaults(mut self, seed: bool) -> Self {
        self.store = self.store.with_seed_defaults(seed);
        self
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn bus(&self) -> &ChangeBus {
        self.store.bus()
    }

    /// Move pending cross-context signals onto the bus.
    /// Returns how many were delivered.
    pub fn pump(&self) -> usize {
        let events = self.events.poll();
        let count = events.len();
        for event in events {
            self.store.bus().deliver(event);
        }
        count
    }
}
