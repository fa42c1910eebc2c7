use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::file_storage::{FileStorage, WriteLog, key_for_path};
use crate::io::storage::{Storage, StorageEvent, StorageEventSource};

/// Turns raw file contents into storage events, dropping echoes of our own
/// writes and repeat notifications for content already reported.
pub(crate) struct EchoFilter {
    written: WriteLog,
    seen: HashMap<String, Option<String>>,
}

impl EchoFilter {
    pub(crate) fn new(written: WriteLog, seen: HashMap<String, Option<String>>) -> Self {
        EchoFilter { written, seen }
    }

    pub(crate) fn classify(&mut self, key: String, current: Option<String>) -> Option<StorageEvent> {
        // A logged write matches at most one observation; any content seen
        // after it, ours or not, retires the entry.
        let ours = {
            let mut log = self.written.lock().unwrap_or_else(|p| p.into_inner());
            log.remove(&key).is_some_and(|written| written == current)
        };
        if ours {
            self.seen.insert(key, current);
            return None;
        }
        if self.seen.get(&key) == Some(&current) {
            return None;
        }
        let old_value = self.seen.insert(key.clone(), current.clone()).flatten();
        Some(StorageEvent {
            key,
            old_value,
            new_value: current,
        })
    }
}

/// Watches a store directory and reports writes made by other processes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StorageEvent>,
}

impl StoreWatcher {
    /// Start watching the directory behind `storage`.
    /// Returns a `StoreWatcher` whose `poll()` method should be called each tick.
    pub fn start(storage: &FileStorage) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir: PathBuf = storage.dir().to_path_buf();

        let mut seen = HashMap::new();
        for key in storage.keys().unwrap_or_default() {
            let value = storage.get_item(&key).ok().flatten();
            seen.insert(key, value);
        }
        let mut filter = EchoFilter::new(storage.write_log(), seen);
        let dir_owned = dir.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "store watcher error");
                        return;
                    }
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                for path in event.paths {
                    if !path.starts_with(&dir_owned) {
                        continue;
                    }
                    let Some(key) = key_for_path(&path) else {
                        continue;
                    };
                    let current = read_current(&path);
                    if let Some(change) = filter.classify(key, current) {
                        tracing::debug!(key = %change.key, "external change detected");
                        let _ = tx.send(change);
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }
}

impl StorageEventSource for StoreWatcher {
    /// Non-blocking poll for pending events.
    fn poll(&self) -> Vec<StorageEvent> {
        self.rx.try_iter().collect()
    }
}

/// Current content of a store file; a missing file reads as removed.
fn read_current(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}
