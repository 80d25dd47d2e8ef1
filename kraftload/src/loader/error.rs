//! Load errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a version could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The version has no directory in the local store.
    #[error("version {version} is not installed (expected {})", .path.display())]
    NotInstalled { version: String, path: PathBuf },

    /// The version is installed but its module could not be initialised.
    #[error("version {version} failed to initialize: {reason}")]
    InitFailed { version: String, reason: String },
}

impl LoadError {
    /// Version the failed load was for.
    pub fn version(&self) -> &str {
        match self {
            Self::NotInstalled { version, .. } | Self::InitFailed { version, .. } => version,
        }
    }
}
