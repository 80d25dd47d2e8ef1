//! Configuration file support.
//!
//! Settings live in an INI file, by default at
//! `~/.config/kraftload/config.ini` (platform config dir). Every key is
//! optional; missing keys fall back to the built-in defaults.
//!
//! ```ini
//! [artifact]
//! name = math_module
//! storage_dir = packages
//!
//! [remote]
//! base_url = https://storage.googleapis.com
//! bucket = kraft-packages
//! timeout_secs = 30
//!
//! [install]
//! keep_archives = false
//!
//! [logging]
//! level = info
//! file = /var/log/kraftload.log
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::catalog::http::DEFAULT_TIMEOUT_SECS;
use crate::catalog::DEFAULT_BASE_URL;
use crate::logging::{LogConfig, DEFAULT_LOG_LEVEL};
use crate::manager::{ManagerConfig, DEFAULT_ARTIFACT, DEFAULT_BUCKET, DEFAULT_STORAGE_DIR};

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "kraftload";

/// Config filename.
pub const CONFIG_FILENAME: &str = "config.ini";

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Syntax(String),

    #[error("failed to render config: {0}")]
    Render(std::io::Error),

    #[error("invalid value for [{section}] {key}: '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("no platform config directory available")]
    NoConfigDir,
}

/// Default config file location.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub artifact: String,
    pub storage_dir: PathBuf,
    pub base_url: String,
    pub bucket: String,
    pub timeout_secs: u64,
    pub keep_archives: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            artifact: DEFAULT_ARTIFACT.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            keep_archives: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl ConfigFile {
    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Syntax(e.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("artifact")) {
            if let Some(name) = non_empty(section.get("name")) {
                config.artifact = name.to_string();
            }
            if let Some(dir) = non_empty(section.get("storage_dir")) {
                config.storage_dir = expand_tilde(dir);
            }
        }

        if let Some(section) = ini.section(Some("remote")) {
            if let Some(url) = non_empty(section.get("base_url")) {
                config.base_url = url.to_string();
            }
            if let Some(bucket) = non_empty(section.get("bucket")) {
                config.bucket = bucket.to_string();
            }
            if let Some(value) = non_empty(section.get("timeout_secs")) {
                config.timeout_secs = parse_value("remote", "timeout_secs", value)?;
                if config.timeout_secs == 0 {
                    return Err(invalid("remote", "timeout_secs", value));
                }
            }
        }

        if let Some(section) = ini.section(Some("install")) {
            if let Some(value) = non_empty(section.get("keep_archives")) {
                config.keep_archives = parse_value("install", "keep_archives", value)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = non_empty(section.get("level")) {
                config.log_level = level.to_string();
            }
            if let Some(file) = non_empty(section.get("file")) {
                config.log_file = Some(expand_tilde(file));
            }
        }

        Ok(config)
    }

    /// Render as INI text.
    pub fn to_ini(&self) -> Result<String, ConfigError> {
        let mut ini = Ini::new();
        ini.with_section(Some("artifact"))
            .set("name", &self.artifact)
            .set("storage_dir", self.storage_dir.to_string_lossy());
        ini.with_section(Some("remote"))
            .set("base_url", &self.base_url)
            .set("bucket", &self.bucket)
            .set("timeout_secs", self.timeout_secs.to_string());
        ini.with_section(Some("install"))
            .set("keep_archives", self.keep_archives.to_string());
        let mut logging = ini.with_section(Some("logging"));
        logging.set("level", &self.log_level);
        if let Some(file) = &self.log_file {
            logging.set("file", file.to_string_lossy());
        }

        let mut out = Vec::new();
        ini.write_to(&mut out).map_err(ConfigError::Render)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(path, self.to_ini()?).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Manager settings derived from this file.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::new(&self.artifact, &self.storage_dir)
            .with_base_url(&self.base_url)
            .with_bucket(&self.bucket)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_keep_archives(self.keep_archives)
    }

    /// Logging settings derived from this file.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            file: self.log_file.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(section, key, value))
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
