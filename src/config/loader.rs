// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// Relative directories are anchored at the config file's parent directory.
/// No semantic validation happens here; use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    config.resolve_relative_to(&config_root_dir(path));

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the built-in defaults
/// anchored at the current working directory.
///
/// Used for the implicit default path only: an explicitly requested config
/// file that is missing should go through [`load_from_path`] and fail.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    if path.is_file() {
        return load_from_path(path);
    }

    debug!(?path, "no config file found; using defaults");
    let mut config = RawConfigFile::default();
    config.resolve_relative_to(&current_dir());
    Ok(config)
}

/// Default config location: `Lesswatch.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Lesswatch.toml")
}

/// Directory that relative config paths are resolved against.
///
/// A bare file name like `Lesswatch.toml` has an empty parent, in which case
/// the current working directory is used.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
