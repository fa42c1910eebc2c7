use std::fmt;

use serde_json::Value;

use crate::io::collection_io::{decode_items, into_items};
use crate::model::record::{Record, RecordId, Stored, capitalized};
use crate::ops::collection_ops;
use crate::store::{
    CollectionStore, StoreError, added_message, deleted_message, now_ms, updated_message,
};
use crate::sync::bus::{ChangeEvent, Payload, Subscription};

/// A transient, user-visible confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
        }
    }

    /// "Project added successfully"
    pub fn success<R: Record>(verb: &str) -> Self {
        Notice::new(format!("{} {} successfully", capitalized(R::KIND), verb))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A screen's live snapshot of one collection.
///
/// The snapshot is loaded once on activation and afterwards replaced by
/// whatever the change notifications carry. Call [`sync`](Self::sync)
/// before acting on it.
pub struct ViewBinding<T: Stored> {
    store: CollectionStore,
    items: Vec<T>,
    subscription: Subscription,
}

impl<T: Stored> ViewBinding<T> {
    /// Subscribe to the collection, then load it.
    pub fn activate(store: &CollectionStore) -> Result<Self, StoreError> {
        let subscription = store.bus().subscribe(T::KEY);
        let items = store.load::<T>()?;
        tracing::debug!(key = T::KEY, count = items.len(), "view activated");
        Ok(ViewBinding {
            store: store.clone(),
            items,
            subscription,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    /// Apply pending change notifications, oldest first; the last one wins.
    /// Returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let events = self.subscription.poll();
        let count = events.len();
        for event in events {
            self.items = snapshot_from(&event);
        }
        count
    }

    /// Commit `items` as the whole collection and adopt them.
    pub fn replace(&mut self, items: Vec<T>) -> Result<(), StoreError> {
        self.store.commit(&items)?;
        self.items = items;
        Ok(())
    }
}

/// Decode the collection a notification carries. A removed or undecodable
/// value is an empty collection.
fn snapshot_from<T: Stored>(event: &ChangeEvent) -> Vec<T> {
    match &event.payload {
        Payload::Value(Value::Array(values)) => into_items(values.clone()),
        Payload::Value(_) => Vec::new(),
        Payload::Serialized(raw) => decode_items(raw.as_deref(), now_ms()),
    }
}

impl<R: Record> ViewBinding<R> {
    pub fn find(&self, id: RecordId) -> Option<&R> {
        collection_ops::find_record(&self.items, id)
    }

    /// Validate and append `record` to the snapshot, then commit.
    pub fn add(&mut self, record: R) -> Result<(R, Notice), StoreError> {
        record.validate()?;
        let mut items = self.items.clone();
        let added = collection_ops::add_record(&mut items, record, now_ms());
        self.replace(items)?;
        self.store.record_activity(added_message(&added))?;
        Ok((added, Notice::success::<R>("added")))
    }

    /// Validate and replace the record with the same id, then commit.
    pub fn update(&mut self, record: R) -> Result<Notice, StoreError> {
        record.validate()?;
        let mut items = self.items.clone();
        collection_ops::update_record(&mut items, record.clone())?;
        self.replace(items)?;
        self.store.record_activity(updated_message(&record))?;
        Ok(Notice::success::<R>("updated"))
    }

    /// Remove the record with `id` from the snapshot, then commit.
    pub fn remove(&mut self, id: RecordId) -> Result<(R, Notice), StoreError> {
        let mut items = self.items.clone();
        let removed = collection_ops::remove_record(&mut items, id)?;
        self.replace(items)?;
        self.store.record_activity(deleted_message(&removed))?;
        Ok((removed, Notice::success::<R>("deleted")))
    }
}
