use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::io::storage::{Storage, StorageError, StorageEvent, StorageEventSource, validate_key};

/// Identifies one context attached to a [`MemoryOrigin`].
pub type ContextId = u64;

/// An in-memory medium shared by any number of contexts.
///
/// Each context gets its own [`MemoryStorage`] handle and [`MemoryEvents`]
/// queue. A write through one handle is visible to all of them and raises
/// a [`StorageEvent`] in every *other* context's queue.
#[derive(Clone, Default)]
pub struct MemoryOrigin {
    inner: Arc<Mutex<OriginState>>,
}

#[derive(Default)]
struct OriginState {
    items: BTreeMap<String, String>,
    listeners: Vec<(ContextId, mpsc::Sender<StorageEvent>)>,
    next_context: ContextId,
    /// Total bytes (keys + values) the origin may hold.
    quota: Option<usize>,
}

impl OriginState {
    fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn broadcast(&mut self, from: ContextId, event: StorageEvent) {
        // Listeners whose queue was dropped are forgotten.
        self.listeners.retain(|(id, tx)| *id == from || tx.send(event.clone()).is_ok());
    }
}

impl MemoryOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    /// An origin that rejects writes growing it beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let origin = Self::default();
        origin.lock().quota = Some(bytes);
        origin
    }

    /// Attach a new context to this origin.
    pub fn open_context(&self) -> (MemoryStorage, MemoryEvents) {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        let id = state.next_context;
        state.next_context += 1;
        state.listeners.push((id, tx));
        drop(state);

        (
            MemoryStorage {
                origin: self.inner.clone(),
                context: id,
            },
            MemoryEvents { rx },
        )
    }

    fn lock(&self) -> MutexGuard<'_, OriginState> {
        lock_state(&self.inner)
    }
}

fn lock_state(inner: &Mutex<OriginState>) -> MutexGuard<'_, OriginState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One context's view of a [`MemoryOrigin`].
#[derive(Clone)]
pub struct MemoryStorage {
    origin: Arc<Mutex<OriginState>>,
    context: ContextId,
}

impl MemoryStorage {
    pub fn context_id(&self) -> ContextId {
        self.context
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock_state(&self.origin).items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut state = lock_state(&self.origin);

        if let Some(limit) = state.quota {
            let current = state.items.get(key).map_or(0, |v| key.len() + v.len());
            let needed = state.used_bytes() - current + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        let old_value = state.items.insert(key.to_string(), value.to_string());
        if old_value.as_deref() == Some(value) {
            return Ok(());
        }
        state.broadcast(
            self.context,
            StorageEvent {
                key: key.to_string(),
                old_value,
                new_value: Some(value.to_string()),
            },
        );
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut state = lock_state(&self.origin);
        if let Some(old_value) = state.items.remove(key) {
            state.broadcast(
                self.context,
                StorageEvent {
                    key: key.to_string(),
                    old_value: Some(old_value),
                    new_value: None,
                },
            );
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(lock_state(&self.origin).items.keys().cloned().collect())
    }
}

/// Pending storage events for one context of a [`MemoryOrigin`].
pub struct MemoryEvents {
    rx: mpsc::Receiver<StorageEvent>,
}

impl StorageEventSource for MemoryEvents {
    fn poll(&self) -> Vec<StorageEvent> {
        self.rx.try_iter().collect()
    }
}
