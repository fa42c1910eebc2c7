use std::path::PathBuf;

use crate::model::config::FolioConfig;

/// Name of the directory that marks a project root.
pub const FOLIO_DIR: &str = "folio";
/// Config file inside [`FOLIO_DIR`].
pub const CONFIG_FILE: &str = "folio.toml";
/// Store directory inside [`FOLIO_DIR`]; one `<key>.json` per collection.
pub const STORE_DIR: &str = "store";

/// A discovered folio project on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `folio/`
    pub root: PathBuf,
    /// The `folio/` directory itself
    pub folio_dir: PathBuf,
    pub config: FolioConfig,
}

impl Workspace {
    pub fn store_dir(&self) -> PathBuf {
        self.folio_dir.join(STORE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.folio_dir.join(CONFIG_FILE)
    }
}
