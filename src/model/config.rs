use serde::{Deserialize, Serialize};

/// Configuration from folio.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    pub store: StoreInfo,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Populate an absent `projects` key with the default project set.
    #[serde(default)]
    pub seed_projects: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    /// How often `folio watch` polls for changes from other processes.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            rows_per_page: default_rows_per_page(),
            watch_interval_ms: default_watch_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the REST backend, e.g. `https://api.example.com/api`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_rows_per_page() -> usize {
    5
}

fn default_watch_interval_ms() -> u64 {
    200
}

fn default_timeout_secs() -> u64 {
    30
}
