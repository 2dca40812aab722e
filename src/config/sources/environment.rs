//! Environment variable source: SNAPSTORE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `SNAPSTORE__STORAGE__BACKEND=memory` sets `storage.backend`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("SNAPSTORE")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
