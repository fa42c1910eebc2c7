use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use crate::io::storage::{Storage, StorageError, validate_key};

/// File extension of stored values.
pub const VALUE_EXT: &str = "json";

/// Values this process last wrote, by key (`None` = removed).
///
/// Shared with the [`StoreWatcher`](crate::io::watcher::StoreWatcher) so it
/// can drop the file system's echo of our own writes.
pub type WriteLog = Arc<Mutex<HashMap<String, Option<String>>>>;

/// A directory-backed medium: key `k` lives in `<dir>/k.json`.
///
/// Several processes may open the same directory; each sees the others'
/// writes on its next read.
#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
    written: WriteLog,
}

impl FileStorage {
    /// Open (creating if needed) the store directory.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| StorageError::WriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileStorage {
            dir: dir.to_path_buf(),
            written: Arc::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, VALUE_EXT))
    }

    pub(crate) fn write_log(&self) -> WriteLog {
        self.written.clone()
    }

    fn remember(&self, key: &str, value: Option<&str>) {
        let mut log = self.written.lock().unwrap_or_else(|p| p.into_inner());
        log.insert(key.to_string(), value.map(str::to_string));
    }
}

/// Map a store file path back to its key, if it is one.
pub fn key_for_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    validate_key(stem).ok()?;
    Some(stem.to_string())
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        // Record before the rename lands so the watcher can never see the
        // new content without knowing it is ours.
        self.remember(key, Some(value));
        atomic_write(&path, value.as_bytes())
            .map_err(|e| StorageError::WriteError { path, source: e })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        self.remember(key, None);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteError { path, source: e }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::ReadError {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| key_for_path(&entry.path()))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
