//! Configuration
//!
//! Layered configuration built with the `config` crate: built-in defaults, an
//! optional global file, an optional `snapstore.toml` next to the scanned
//! root, then `SNAPSTORE__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod storage;

pub use facade::ConfigLoader;
pub use storage::{StorageBackend, StorageConfig};

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

fn default_author() -> String {
    "snapstore".to_string()
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Author recorded on every snapshot
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            author: default_author(),
        }
    }
}
