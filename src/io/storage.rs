use std::path::PathBuf;

/// Error type for storage medium operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key \"{0}\": use letters, digits, '-' or '_'")]
    InvalidKey(String),
    #[error("storage quota exceeded writing \"{key}\" ({needed} bytes, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A string key-value medium shared by every context of one origin.
///
/// Values are opaque strings; collections store their JSON encoding.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// The medium's native change signal.
///
/// Delivered to every context sharing the medium except the one that wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Non-blocking source of [`StorageEvent`]s from other contexts.
pub trait StorageEventSource: Send {
    /// Drain every pending event, oldest first. May be empty.
    fn poll(&self) -> Vec<StorageEvent>;
}

/// A source that never produces events, for a context that is alone on
/// its medium.
pub struct NoEvents;

impl StorageEventSource for NoEvents {
    fn poll(&self) -> Vec<StorageEvent> {
        Vec::new()
    }
}

/// Keys map to file names, so they are restricted to a portable charset.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
