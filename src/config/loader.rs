// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, ConfigOverrides, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Build the effective configuration: defaults, then the config file, then
/// `overrides`.
///
/// - An explicit `path` must exist.
/// - Without one, [`default_config_path`] is used if present; otherwise
///   the built-in defaults apply.
pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(p) => load_from_path(p)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default config file");
                load_from_path(&default_path)?
            } else {
                debug!("no config file found, using built-in defaults");
                RawConfigFile::default()
            }
        }
    };

    overrides.apply(&mut raw);
    ConfigFile::try_from(raw)
}

/// `Daqsweep.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Daqsweep.toml")
}
