use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::io::collection_io::{decode_or_empty, into_items, normalize, save_values};
use crate::io::storage::{Storage, StorageError};
use crate::model::activity::Activity;
use crate::model::record::{Record, RecordId, Stored, ValidationError};
use crate::ops::collection_ops::{self, RecordError};
use crate::sync::bus::ChangeBus;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("could not encode collection: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Named collections on one storage medium, announcing every commit on
/// the context's [`ChangeBus`].
///
/// Writes are full overwrites of the collection. Two contexts writing from
/// stale snapshots both succeed and the later write wins.
#[derive(Clone)]
pub struct CollectionStore {
    storage: Arc<dyn Storage>,
    bus: ChangeBus,
    seed_defaults: bool,
}

impl CollectionStore {
    pub fn new(storage: Arc<dyn Storage>, bus: ChangeBus) -> Self {
        CollectionStore {
            storage,
            bus,
            seed_defaults: false,
        }
    }

    /// Populate absent collections from [`Stored::seed`] on first load.
    pub fn with_seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Read the collection `T` lives in.
    ///
    /// Absent or undecodable data reads as empty. For id-keyed records,
    /// elements without a usable id get one, and the repaired collection is
    /// written back (without a notification) only if something changed.
    pub fn load<T: Stored>(&self) -> Result<Vec<T>, StoreError> {
        let raw = self.storage.get_item(T::KEY)?;

        if raw.is_none() && self.seed_defaults {
            let seed = T::seed();
            if !seed.is_empty() {
                return self.install_seed(seed);
            }
        }

        let values = decode_or_empty(T::KEY, raw.as_deref());
        if !T::KEYED {
            return Ok(into_items(values));
        }

        let normalized = normalize(values, now_ms());
        if normalized.changed {
            tracing::debug!(key = T::KEY, "persisting normalized collection");
            if let Err(e) = save_values(self.storage.as_ref(), T::KEY, &normalized.values) {
                tracing::warn!(key = T::KEY, error = %e, "could not persist normalized collection");
            }
        }
        Ok(into_items(normalized.values))
    }

    fn install_seed<T: Stored>(&self, seed: Vec<T>) -> Result<Vec<T>, StoreError> {
        let values = match serde_json::to_value(&seed)? {
            Value::Array(values) => values,
            _ => Vec::new(),
        };
        let values = if T::KEYED {
            normalize(values, now_ms()).values
        } else {
            values
        };
        tracing::debug!(key = T::KEY, count = values.len(), "seeding collection");
        save_values(self.storage.as_ref(), T::KEY, &values)?;
        Ok(into_items(values))
    }

    /// Overwrite the stored collection with `items`, then notify this
    /// context's subscribers with the new value.
    ///
    /// A failed write notifies no one.
    pub fn commit<T: Stored>(&self, items: &[T]) -> Result<(), StoreError> {
        let value = serde_json::to_value(items)?;
        self.storage.set_item(T::KEY, &value.to_string())?;
        tracing::debug!(key = T::KEY, count = items.len(), "collection committed");
        self.bus.notify_local(T::KEY, value);
        Ok(())
    }

    /// Validate, append to the persisted collection, and log the activity.
    pub fn add_record<R: Record>(&self, record: R) -> Result<R, StoreError> {
        record.validate()?;
        let mut items = self.load::<R>()?;
        let added = collection_ops::add_record(&mut items, record, now_ms());
        self.commit(&items)?;
        self.record_activity(added_message(&added))?;
        Ok(added)
    }

    /// Validate and replace the persisted record with the same id.
    pub fn update_record<R: Record>(&self, record: R) -> Result<R, StoreError> {
        record.validate()?;
        let mut items = self.load::<R>()?;
        collection_ops::update_record(&mut items, record.clone())?;
        self.commit(&items)?;
        self.record_activity(updated_message(&record))?;
        Ok(record)
    }

    /// Remove the persisted record with `id`. Returns what was removed.
    pub fn remove_record<R: Record>(&self, id: RecordId) -> Result<R, StoreError> {
        let mut items = self.load::<R>()?;
        let removed = collection_ops::remove_record(&mut items, id)?;
        self.commit(&items)?;
        self.record_activity(deleted_message(&removed))?;
        Ok(removed)
    }

    /// Prepend an entry to the bounded activity log.
    pub fn record_activity(&self, message: impl Into<String>) -> Result<Vec<Activity>, StoreError> {
        let mut log = self.load::<Activity>()?;
        collection_ops::push_activity(&mut log, Activity::new(message, now_ms()));
        self.commit(&log)?;
        Ok(log)
    }

    /// Read a settings scalar. Absent or undecodable values read as `None`.
    pub fn load_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.storage.get_item(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(key, error = %e, "discarding undecodable setting");
                Ok(None)
            }
        }
    }

    /// Write a settings scalar and notify subscribers of `key`.
    pub fn save_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.storage.set_item(key, &value.to_string())?;
        self.bus.notify_local(key, value);
        Ok(())
    }
}

pub fn added_message<R: Record>(record: &R) -> String {
    format!("Added {}: {}", R::KIND, record.label())
}

pub fn updated_message<R: Record>(record: &R) -> String {
    format!("Updated {}: {}", R::KIND, record.label())
}

pub fn deleted_message<R: Record>(record: &R) -> String {
    format!("Deleted {}: {}", R::KIND, record.label())
}
