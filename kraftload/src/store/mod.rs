//! Local installation registry.
//!
//! The layout under the storage root is the only durable record of what is
//! installed:
//!
//! ```text
//! {storage_dir}/
//! └── {artifact}/              artifact root
//!     ├── 1.0.0/               one directory per unpacked version
//!     │   └── {artifact}/...
//!     ├── 2.0.0/
//!     ├── 2.0.0.tar.gz         downloaded archive (transient)
//!     └── .staging-3.0.0-4242/ in-progress extraction (never a version)
//! ```
//!
//! "Installed" and "previous" are always derived from one directory
//! enumeration, never stored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::ARCHIVE_EXTENSION;
use crate::manager::{ManagerError, ManagerResult};
use crate::version::Version;

/// Versions present on disk at the moment of one enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalVersions {
    /// Ascending.
    versions: Vec<Version>,
}

impl LocalVersions {
    /// Build from an arbitrary set of versions.
    pub fn new(mut versions: Vec<Version>) -> Self {
        versions.sort();
        Self { versions }
    }

    /// Highest version present.
    pub fn installed(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Second-highest version present.
    pub fn previous(&self) -> Option<&Version> {
        let len = self.versions.len();
        if len >= 2 {
            self.versions.get(len - 2)
        } else {
            None
        }
    }

    /// All versions in ascending order.
    pub fn all(&self) -> &[Version] {
        &self.versions
    }

    /// Whether `version` is present.
    pub fn contains(&self, version: &Version) -> bool {
        self.versions.iter().any(|v| v.as_str() == version.as_str())
    }

    /// Number of versions present.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// On-disk store of unpacked versions for one artifact.
#[derive(Debug, Clone)]
pub struct LocalStore {
    artifact_root: PathBuf,
}

impl LocalStore {
    /// Create a store for `artifact` under `storage_dir`.
    ///
    /// Nothing is created on disk until something is installed.
    pub fn new(storage_dir: impl AsRef<Path>, artifact: &str) -> Self {
        Self {
            artifact_root: storage_dir.as_ref().join(artifact),
        }
    }

    /// Directory holding every version of the artifact.
    pub fn artifact_root(&self) -> &Path {
        &self.artifact_root
    }

    /// Directory a version is (or would be) unpacked into.
    pub fn version_dir(&self, version: &Version) -> PathBuf {
        self.artifact_root.join(version.as_str())
    }

    /// Where the downloaded archive for a version is kept.
    pub fn archive_path(&self, version: &Version) -> PathBuf {
        self.artifact_root
            .join(format!("{}.{}", version.as_str(), ARCHIVE_EXTENSION))
    }

    /// Enumerate installed versions once.
    ///
    /// Entries that are not directories, or whose names do not parse as a
    /// version, are ignored. A missing or vanished root yields an empty set.
    pub fn snapshot(&self) -> LocalVersions {
        let entries = match fs::read_dir(&self.artifact_root) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(
                        path = %self.artifact_root.display(),
                        error = %e,
                        "Artifact root unreadable, treating as empty"
                    );
                }
                return LocalVersions::default();
            }
        };

        let versions = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name();
                Version::parse(name.to_str()?).ok()
            })
            .collect();

        LocalVersions::new(versions)
    }

    /// Highest installed version.
    pub fn installed_version(&self) -> Option<Version> {
        self.snapshot().installed().cloned()
    }

    /// Second-highest installed version.
    pub fn previous_version(&self) -> Option<Version> {
        self.snapshot().previous().cloned()
    }

    /// Whether a version directory is present.
    pub fn contains(&self, version: &Version) -> bool {
        self.version_dir(version).is_dir()
    }

    /// Permanently delete a version directory.
    ///
    /// Removing a version that is not present is not an error.
    pub fn remove_version(&self, version: &Version) -> ManagerResult<()> {
        let dir = self.version_dir(version);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!(version = %version, path = %dir.display(), "Removed installed version");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ManagerError::RemoveFailed { path: dir, source: e }),
        }
    }
}
