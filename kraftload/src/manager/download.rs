//! Archive download for a single artifact version.
//!
//! Archives are fetched from a deterministic, version-templated URL and
//! written next to the version directories. There is no checksum or size
//! verification: the store publishes none, so a truncated transfer is only
//! caught when extraction fails.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::{ManagerError, ManagerResult};
use crate::catalog::{Endpoints, HttpClient, HttpError};
use crate::store::LocalStore;
use crate::version::Version;

/// Downloads version archives into the local store.
pub struct ArtifactDownloader<C: HttpClient> {
    client: Arc<C>,
    endpoints: Endpoints,
    store: LocalStore,
}

impl<C: HttpClient> ArtifactDownloader<C> {
    /// Create a downloader writing into `store`.
    pub fn new(client: Arc<C>, endpoints: Endpoints, store: LocalStore) -> Self {
        Self {
            client,
            endpoints,
            store,
        }
    }

    /// Download the archive for `version` and return its local path.
    ///
    /// Missing parent directories are created. A previous archive at the same
    /// path is overwritten.
    pub fn fetch(&self, version: &Version) -> ManagerResult<PathBuf> {
        let url = self.endpoints.archive_url(version);
        let dest = self.store.archive_path(version);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        debug!(%url, dest = %dest.display(), "Downloading archive");

        let file = File::create(&dest).map_err(|e| ManagerError::WriteFailed {
            path: dest.clone(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        let bytes = self
            .client
            .download_to(&url, &mut writer)
            .map_err(|e| match e {
                HttpError::WriteFailed { reason, .. } => ManagerError::WriteFailed {
                    path: dest.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, reason),
                },
                other => ManagerError::from_http(&url, other),
            })?;

        writer.flush().map_err(|e| ManagerError::WriteFailed {
            path: dest.clone(),
            source: e,
        })?;

        info!(version = %version, bytes, path = %dest.display(), "Archive downloaded");
        Ok(dest)
    }
}
