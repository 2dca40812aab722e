//! StorageConfig and store path resolution.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which object store and history log backs a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Memory,
}

fn default_ignore() -> Vec<String> {
    vec![".git".to_string()]
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Store directory; relative paths are taken from the scanned root.
    /// None means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Entry names the working-tree scanner skips
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            ignore: default_ignore(),
        }
    }
}

impl StorageConfig {
    /// Resolve the store directory.
    pub fn resolve_path(&self, root: Option<&Path>) -> Result<PathBuf, ApiError> {
        match (&self.path, root) {
            (Some(path), Some(root)) if path.is_relative() => Ok(root.join(path)),
            (Some(path), _) => Ok(path.clone()),
            (None, _) => default_store_path(),
        }
    }
}

fn default_store_path() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "snapstore", "snapstore").ok_or_else(
        || ApiError::ConfigError("Could not determine platform data directory".to_string()),
    )?;
    Ok(project_dirs.data_dir().join("store"))
}
