//! Error types for the artifact manager.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::HttpError;
use crate::loader::LoadError;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur during artifact lifecycle operations.
///
/// Fetch, extract and load failures are distinct and recoverable: none of
/// them leaves a partially populated version directory behind.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Failed to download an archive.
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// A remote request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Archive is corrupt or the target could not be written.
    #[error("failed to extract {}: {reason}", .path.display())]
    ExtractFailed { path: PathBuf, reason: String },

    /// Installed files are missing or failed to initialise.
    #[error(transparent)]
    LoadFailed(#[from] LoadError),

    /// The remote catalog has no version to update to.
    #[error("nothing to update to: no versions available in the remote catalog")]
    NothingToUpdate,

    /// Fewer than two versions are installed.
    #[error("nothing to roll back to: no previous version installed")]
    NothingToRollback,

    /// No version is installed, so there is nothing to load.
    #[error("no version of {artifact} is installed")]
    NothingInstalled { artifact: String },

    /// Compute inputs could not be used.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The loaded version does not export the requested operation.
    #[error("version {version} does not export '{operation}'")]
    Unsupported { version: String, operation: String },

    /// Documentation could not be retrieved.
    #[error("failed to fetch documentation: {0}")]
    DocsFailed(HttpError),

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file or directory.
    #[error("failed to remove {}: {source}", .path.display())]
    RemoveFailed { path: PathBuf, source: io::Error },
}

impl ManagerError {
    /// Whether this failure happened while retrieving remote data.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::Timeout { .. })
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } | Self::Timeout { .. } => "fetch_failed",
            Self::ExtractFailed { .. } => "extract_failed",
            Self::LoadFailed(_) => "load_failed",
            Self::NothingToUpdate => "nothing_to_update",
            Self::NothingToRollback => "nothing_to_rollback",
            Self::NothingInstalled { .. } => "nothing_installed",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unsupported { .. } => "unsupported",
            Self::DocsFailed(_) => "docs_failed",
            Self::CreateDirFailed { .. } | Self::WriteFailed { .. } | Self::RemoveFailed { .. } => {
                "storage_failed"
            }
        }
    }

    /// Map an HTTP failure on `url` to a fetch error.
    pub(crate) fn from_http(url: &str, err: HttpError) -> Self {
        match err {
            HttpError::Timeout { url, timeout_secs } => Self::Timeout { url, timeout_secs },
            other => Self::FetchFailed {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ManagerError::NothingToRollback.to_string(),
            "nothing to roll back to: no previous version installed"
        );

        let err = ManagerError::ExtractFailed {
            path: PathBuf::from("/pkgs/1.0.0.tar.gz"),
            reason: "unexpected end of file".to_string(),
        };
        assert!(err.to_string().contains("/pkgs/1.0.0.tar.gz"));
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn test_from_http_timeout_is_transient() {
        let err = ManagerError::from_http(
            "http://x/a.tar.gz",
            HttpError::Timeout {
                url: "http://x/a.tar.gz".to_string(),
                timeout_secs: 30,
            },
        );
        assert!(err.is_fetch_failure());
        assert!(err.is_transient());
        assert_eq!(err.kind(), "fetch_failed");
    }

    #[test]
    fn test_from_http_status_is_fetch_failure() {
        let err = ManagerError::from_http(
            "http://x/a.tar.gz",
            HttpError::Status {
                url: "http://x/a.tar.gz".to_string(),
                status: 404,
            },
        );
        assert!(err.is_fetch_failure());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ManagerError::NothingToUpdate.kind(), "nothing_to_update");
        assert_eq!(
            ManagerError::InvalidArgument("a".to_string()).kind(),
            "invalid_argument"
        );
    }
}
