//! MergeService: orchestrates sources and deserializes to SnapConfig.

use super::builder_with_defaults;
use crate::config::sources::{environment, file};
use crate::config::SnapConfig;
use config::ConfigError;
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> root file -> environment (highest).
    pub fn load(root: &Path) -> Result<SnapConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_global(builder)?;
        let builder = file::add_root(builder, root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Defaults -> the given file (must exist) -> environment.
    pub fn load_from_file(path: &Path) -> Result<SnapConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_explicit(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
