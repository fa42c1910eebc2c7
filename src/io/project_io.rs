use std::fs;
use std::path::{Path, PathBuf};

use crate::io::file_storage::FileStorage;
use crate::io::storage::StorageError;
use crate::model::config::FolioConfig;
use crate::model::workspace::{CONFIG_FILE, FOLIO_DIR, Workspace};

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a folio project: no folio/ directory found")]
    NotAProject,
    #[error("I/O error: {0}")]
    IoError(std::io::Error),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse folio.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit folio.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Discover the folio project by walking up from the given directory,
/// looking for a `folio/` subdirectory with a config file.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let folio_dir = current.join(FOLIO_DIR);
        if folio_dir.is_dir() && folio_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load the project rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, ProjectError> {
    let folio_dir = root.join(FOLIO_DIR);
    if !folio_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }

    let config_path = folio_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: FolioConfig = toml::from_str(&config_text)?;
    tracing::debug!(root = %root.display(), store = %config.store.name, "loaded project");

    Ok(Workspace {
        root: root.to_path_buf(),
        folio_dir,
        config,
    })
}

/// Open the file-backed store of a project.
pub fn open_storage(workspace: &Workspace) -> Result<FileStorage, ProjectError> {
    Ok(FileStorage::open(&workspace.store_dir())?)
}
