//! Remote catalog of published artifact versions.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::endpoints::Endpoints;
use super::http::{HttpClient, HttpError};
use crate::version::{self, Version};

/// Why a catalog listing could not be produced.
///
/// These never escape [`RemoteCatalog::list_versions`]; they exist so the
/// degraded path is named and observable through
/// [`RemoteCatalog::try_list_versions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The listing endpoint could not be reached or answered with an error.
    #[error("catalog unavailable: {0}")]
    Unavailable(#[from] HttpError),

    /// The listing response was not in the expected format.
    #[error("malformed catalog listing from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Object listing returned by the store for a prefix/delimiter query.
#[derive(Debug, Deserialize)]
struct ObjectListing {
    #[serde(default)]
    prefixes: Vec<String>,
}

/// Client for the remote version catalog of one artifact.
///
/// Every call performs a fresh listing; nothing is cached between queries.
pub struct RemoteCatalog<C: HttpClient> {
    client: Arc<C>,
    endpoints: Endpoints,
}

impl<C: HttpClient> RemoteCatalog<C> {
    /// Create a catalog client.
    pub fn new(client: Arc<C>, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Endpoints this catalog reads from.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// List published versions in ascending order.
    ///
    /// Never fails: when the catalog is unavailable or malformed the result
    /// is an empty list, meaning "no known remote versions".
    pub fn list_versions(&self) -> Vec<Version> {
        match self.try_list_versions() {
            Ok(versions) => versions,
            Err(e) => {
                warn!(
                    artifact = self.endpoints.artifact(),
                    error = %e,
                    "Catalog unavailable, treating as no remote versions"
                );
                Vec::new()
            }
        }
    }

    /// List published versions, reporting why the listing failed.
    pub fn try_list_versions(&self) -> Result<Vec<Version>, CatalogError> {
        let url = self.endpoints.catalog_url();
        let body = self.client.get(&url)?;

        let listing: ObjectListing =
            serde_json::from_slice(&body).map_err(|e| CatalogError::Malformed {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let versions = versions_from_prefixes(self.endpoints.artifact(), &listing.prefixes);
        debug!(
            artifact = self.endpoints.artifact(),
            prefixes = listing.prefixes.len(),
            versions = versions.len(),
            "Catalog listed"
        );
        Ok(versions)
    }

    /// Highest published version, if any.
    pub fn latest(&self) -> Option<Version> {
        self.list_versions().pop()
    }
}

/// Extract versions from `{artifact}/{version}/` prefixes.
///
/// Prefixes for other artifacts, and segments that do not parse as a
/// version, are skipped rather than failing the listing.
fn versions_from_prefixes(artifact: &str, prefixes: &[String]) -> Vec<Version> {
    let segments = prefixes.iter().filter_map(|prefix| {
        let rest = prefix.strip_prefix(artifact)?.strip_prefix('/')?;
        rest.split('/').next().filter(|s| !s.is_empty())
    });
    version::parse_sorted(segments)
}
