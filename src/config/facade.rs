//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SnapConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a scanned root: global file, `<root>/snapstore.toml`, environment.
    pub fn load(root: &Path) -> Result<SnapConfig, ConfigError> {
        MergeService::load(root)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<SnapConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> SnapConfig {
        SnapConfig::default()
    }
}
