//! Configuration resolution shared by every command.

use std::path::PathBuf;

use kraftload::config::{default_config_path, ConfigFile};

use crate::error::CliError;

/// Flags that override config file values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub artifact: Option<String>,
    pub bucket: Option<String>,
    pub base_url: Option<String>,
    pub verbose: bool,
}

/// Config file location: `--config`, else the platform default.
pub fn config_path(overrides: &Overrides) -> Result<PathBuf, CliError> {
    match &overrides.config {
        Some(path) => Ok(path.clone()),
        None => Ok(default_config_path()?),
    }
}

/// Load the config file and apply command-line overrides.
///
/// An explicit `--config` must exist; the default location is optional.
pub fn resolve_config(overrides: &Overrides) -> Result<ConfigFile, CliError> {
    let mut config = match &overrides.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    // CLI takes precedence over the file
    if let Some(dir) = &overrides.storage_dir {
        config.storage_dir = dir.clone();
    }
    if let Some(artifact) = &overrides.artifact {
        if artifact.trim().is_empty() {
            return Err(CliError::Config("artifact name must not be empty".to_string()));
        }
        config.artifact = artifact.clone();
    }
    if let Some(bucket) = &overrides.bucket {
        config.bucket = bucket.clone();
    }
    if let Some(url) = &overrides.base_url {
        config.base_url = url.clone();
    }
    if overrides.verbose {
        config.log_level = "debug".to_string();
    }

    Ok(config)
}
