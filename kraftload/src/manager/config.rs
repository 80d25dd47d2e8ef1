//! Configuration for the artifact manager.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::http::DEFAULT_TIMEOUT_SECS;
use crate::catalog::{Endpoints, DEFAULT_BASE_URL};

/// Default artifact name.
pub const DEFAULT_ARTIFACT: &str = "math_module";

/// Default bucket holding published versions.
pub const DEFAULT_BUCKET: &str = "kraft-packages";

/// Default local storage directory (relative to the working directory).
pub const DEFAULT_STORAGE_DIR: &str = "packages";

/// Configuration for the artifact manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Name of the managed artifact.
    ///
    /// Used as the remote prefix, the local directory name and the
    /// namespace the loaded module is bound under.
    pub artifact: String,

    /// Directory holding one subdirectory per artifact.
    pub storage_dir: PathBuf,

    /// Base URL of the object store.
    pub base_url: String,

    /// Bucket holding published versions.
    pub bucket: String,

    /// Timeout for every remote request.
    pub timeout: Duration,

    /// Whether to keep downloaded archives after a successful extraction.
    pub keep_archives: bool,

    /// Fallback module search paths consulted after the version directory.
    pub search_paths: Vec<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            artifact: DEFAULT_ARTIFACT.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            keep_archives: false,
            search_paths: Vec::new(),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration for `artifact` stored under `storage_dir`.
    pub fn new(artifact: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            storage_dir: storage_dir.into(),
            ..Default::default()
        }
    }

    /// Set the object store base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the remote request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable keeping downloaded archives.
    pub fn with_keep_archives(mut self, keep: bool) -> Self {
        self.keep_archives = keep;
        self
    }

    /// Add a fallback module search path.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Remote URL layout for the configured artifact.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url, &self.bucket, &self.artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.artifact, "math_module");
        assert_eq!(config.bucket, "kraft-packages");
        assert_eq!(config.storage_dir, PathBuf::from("packages"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.keep_archives);
        assert!(config.search_paths.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ManagerConfig::new("stats_module", "/var/lib/kraft")
            .with_base_url("http://localhost:9000")
            .with_bucket("staging")
            .with_timeout(Duration::from_secs(5))
            .with_keep_archives(true)
            .with_search_path("/opt/bundled");

        assert_eq!(config.artifact, "stats_module");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/kraft"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.keep_archives);
        assert_eq!(config.search_paths, vec![PathBuf::from("/opt/bundled")]);
        assert_eq!(
            config.endpoints().catalog_url(),
            "http://localhost:9000/storage/v1/b/staging/o?prefix=stats_module/&delimiter=/"
        );
    }
}
