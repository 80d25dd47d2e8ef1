//! Artifact lifecycle management.
//!
//! This module downloads, installs and loads published versions of one
//! artifact, and rolls back to the previous installed version.
//!
//! # Storage Layout
//!
//! Versions are unpacked under `{storage_dir}/{artifact}/{version}/`, see
//! [`crate::store`]. Downloads land next to them as `{version}.tar.gz` and
//! are removed once extracted.

mod config;
mod download;
mod error;
mod extractor;
mod lifecycle;

pub use config::{ManagerConfig, DEFAULT_ARTIFACT, DEFAULT_BUCKET, DEFAULT_STORAGE_DIR};
pub use download::ArtifactDownloader;
pub use error::{ManagerError, ManagerResult};
pub use extractor::{ArchiveExtractor, Installer, ShellExtractor};
pub use lifecycle::{ArtifactStatus, LifecycleController};
