//! Archive extraction and atomic installation of a version.
//!
//! Archives are unpacked into a hidden staging directory next to the version
//! directories and renamed into place only once unpacking succeeded:
//!
//! ```text
//! {artifact_root}/1.2.0.tar.gz
//!        │  tar -xzf
//!        ▼
//! {artifact_root}/.staging-1.2.0-4242/   (never parses as a version)
//!        │  remove old {artifact_root}/1.2.0, then rename
//!        ▼
//! {artifact_root}/1.2.0/
//! ```
//!
//! A failed or interrupted extraction therefore never leaves a
//! present-but-incomplete version directory, and a retry never merges stale
//! and fresh contents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use super::error::{ManagerError, ManagerResult};
use crate::store::LocalStore;
use crate::version::Version;

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive_path` into `dest_dir`, returning the number of files.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize>;
}

/// Shell-based archive extractor.
///
/// Uses the system `tar` for gzip-compressed tarballs, the same tool the
/// publishing side uses to create them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExtractor;

impl ShellExtractor {
    /// Create a new shell-based extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract a tar.gz archive to a destination directory.
    fn extract_tar_gz(&self, archive: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        fs::create_dir_all(dest_dir).map_err(|e| ManagerError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let output = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(dest_dir)
            .output()
            .map_err(|e| ManagerError::ExtractFailed {
                path: archive.to_path_buf(),
                reason: format!("Failed to run tar: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ManagerError::ExtractFailed {
                path: archive.to_path_buf(),
                reason: format!("tar extraction failed: {}", stderr.trim()),
            });
        }

        count_files_recursive(dest_dir)
    }
}

impl ArchiveExtractor for ShellExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        self.extract_tar_gz(archive_path, dest_dir)
    }
}

/// Installs downloaded archives into the local store.
pub struct Installer<X: ArchiveExtractor = ShellExtractor> {
    extractor: X,
    store: LocalStore,
    keep_archives: bool,
}

impl Installer<ShellExtractor> {
    /// Create an installer using the system `tar`.
    pub fn new(store: LocalStore) -> Self {
        Self::with_extractor(ShellExtractor::new(), store)
    }
}

impl<X: ArchiveExtractor> Installer<X> {
    /// Create an installer with a custom extractor.
    pub fn with_extractor(extractor: X, store: LocalStore) -> Self {
        Self {
            extractor,
            store,
            keep_archives: false,
        }
    }

    /// Keep archives after a successful extraction.
    pub fn with_keep_archives(mut self, keep: bool) -> Self {
        self.keep_archives = keep;
        self
    }

    /// Staging directory used while extracting `version`.
    fn staging_dir(&self, version: &Version) -> PathBuf {
        self.store.artifact_root().join(format!(
            ".staging-{}-{}",
            version.as_str(),
            std::process::id()
        ))
    }

    /// Unpack `archive_path` as `version` and return the installed directory.
    ///
    /// On failure the archive is left in place for diagnostics, the staging
    /// directory is removed, and any previously installed copy of the same
    /// version is untouched unless the failure happened during the final
    /// swap.
    pub fn extract(&self, archive_path: &Path, version: &Version) -> ManagerResult<PathBuf> {
        let staging = self.staging_dir(version);
        let target = self.store.version_dir(version);

        remove_dir_if_present(&staging)?;

        let files = match self.extractor.extract(archive_path, &staging) {
            Ok(files) => files,
            Err(e) => {
                discard_staging(&staging);
                return Err(e);
            }
        };
        debug!(version = %version, files, staging = %staging.display(), "Archive unpacked");

        if let Err(e) = remove_dir_if_present(&target) {
            discard_staging(&staging);
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &target) {
            discard_staging(&staging);
            return Err(ManagerError::ExtractFailed {
                path: archive_path.to_path_buf(),
                reason: format!("failed to move into {}: {}", target.display(), e),
            });
        }

        if !self.keep_archives {
            if let Err(e) = fs::remove_file(archive_path) {
                warn!(path = %archive_path.display(), error = %e, "Failed to remove archive");
            }
        }

        info!(version = %version, files, path = %target.display(), "Version installed");
        Ok(target)
    }
}

fn remove_dir_if_present(dir: &Path) -> ManagerResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ManagerError::RemoveFailed {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

fn discard_staging(staging: &Path) {
    if let Err(e) = remove_dir_if_present(staging) {
        warn!(path = %staging.display(), error = %e, "Failed to clean up staging directory");
    }
}

/// Count files recursively in a directory.
fn count_files_recursive(dir: &Path) -> ManagerResult<usize> {
    let mut count = 0;

    if !dir.exists() {
        return Ok(0);
    }

    let entries = fs::read_dir(dir).map_err(|e| ManagerError::ExtractFailed {
        path: dir.to_path_buf(),
        reason: format!("failed to read extracted tree: {}", e),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            count += 1;
        } else if path.is_dir() {
            count += count_files_recursive(&path)?;
        }
    }

    Ok(count)
}
