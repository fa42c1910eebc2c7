use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError, Weak};

use serde_json::Value;

use crate::io::storage::StorageEvent;

/// Which channel carried a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Raised by a write in this context.
    Local,
    /// Raised by the medium for a write made in another context.
    CrossContext,
}

/// The new state of a collection, as carried by its channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The collection itself; subscribers need not re-read storage.
    Value(Value),
    /// Exactly what the other context wrote (`None` if it removed the key).
    Serialized(Option<String>),
}

/// "Collection `key` changed."
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub key: String,
    pub channel: Channel,
    pub payload: Payload,
}

type Handler = Arc<Mutex<Box<dyn FnMut(&ChangeEvent) + Send>>>;

enum Sink {
    Queue(mpsc::Sender<ChangeEvent>),
    Handler(Handler),
}

struct Subscriber {
    id: u64,
    key: String,
    sink: Sink,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl Registry {
    fn add(&mut self, key: &str, sink: Sink) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            key: key.to_string(),
            sink,
        });
        id
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|p| p.into_inner())
}

fn unsubscribe(registry: &Weak<Mutex<Registry>>, id: u64) {
    if let Some(registry) = registry.upgrade() {
        lock(&registry).subscribers.retain(|s| s.id != id);
    }
}

/// Collection-changed notifications for one execution context.
///
/// Cloning yields another handle to the same bus. Delivery is FIFO per
/// subscriber; there is no ordering across contexts.
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every change to `key`. Drain with [`Subscription::poll`].
    pub fn subscribe(&self, key: &str) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = lock(&self.registry).add(key, Sink::Queue(tx));
        Subscription {
            id,
            key: key.to_string(),
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Run `handler` synchronously on every change to `key`.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// publish or subscribe themselves. A handler is not re-entered: a change
    /// published while it is still running skips it.
    pub fn subscribe_fn<F>(&self, key: &str, handler: F) -> HandlerGuard
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        let boxed: Box<dyn FnMut(&ChangeEvent) + Send> = Box::new(handler);
        let handler: Handler = Arc::new(Mutex::new(boxed));
        let id = lock(&self.registry).add(key, Sink::Handler(handler));
        HandlerGuard {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Announce a write made in this context.
    pub fn notify_local(&self, key: &str, value: Value) {
        self.publish(ChangeEvent {
            key: key.to_string(),
            channel: Channel::Local,
            payload: Payload::Value(value),
        });
    }

    /// Forward the medium's signal for a write made in another context.
    pub fn deliver(&self, event: StorageEvent) {
        self.publish(ChangeEvent {
            key: event.key,
            channel: Channel::CrossContext,
            payload: Payload::Serialized(event.new_value),
        });
    }

    /// Number of live subscriptions for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        lock(&self.registry)
            .subscribers
            .iter()
            .filter(|s| s.key == key)
            .count()
    }

    fn publish(&self, event: ChangeEvent) {
        let mut handlers = Vec::new();
        {
            let registry = lock(&self.registry);
            for sub in registry.subscribers.iter().filter(|s| s.key == event.key) {
                match &sub.sink {
                    Sink::Queue(tx) => {
                        let _ = tx.send(event.clone());
                    }
                    Sink::Handler(h) => handlers.push(h.clone()),
                }
            }
        }
        tracing::debug!(key = %event.key, channel = ?event.channel, "collection changed");
        for handler in handlers {
            let mut f = match handler.try_lock() {
                Ok(f) => f,
                Err(TryLockError::Poisoned(p)) => p.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    tracing::debug!(key = %event.key, "handler busy, skipping nested change");
                    continue;
                }
            };
            (*f)(&event);
        }
    }
}

/// A queue of changes to one key. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    key: String,
    rx: mpsc::Receiver<ChangeEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Non-blocking drain of pending changes, oldest first.
    pub fn poll(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        unsubscribe(&self.registry, self.id);
    }
}

/// Keeps a [`ChangeBus::subscribe_fn`] handler registered while alive.
pub struct HandlerGuard {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        unsubscribe(&self.registry, self.id);
    }
}
