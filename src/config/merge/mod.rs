//! Source composition for configuration loading.

pub mod service;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the built-in defaults (lowest precedence).
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("author", "snapstore")?
        .set_default("storage.backend", "sled")?
        .set_default("logging.level", "info")
}
