//! File sources: global config, per-root `snapstore.toml`, explicit path.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

pub const ROOT_CONFIG_FILE: &str = "snapstore.toml";

/// Global config path (`<config dir>/snapstore/config.toml`), if the platform has one.
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "snapstore", "snapstore")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn add_global(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) => Ok(builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )),
        None => Ok(builder),
    }
}

pub fn add_root(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        File::from(root.join(ROOT_CONFIG_FILE))
            .format(FileFormat::Toml)
            .required(false),
    ))
}

pub fn add_explicit(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}
