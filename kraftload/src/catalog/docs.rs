//! Per-version documentation pass-through.
//!
//! Documentation is fetched on demand and never cached. Published READMEs
//! sometimes carry JSON-style escapes from the upload tooling, which are
//! normalised before returning.

use std::sync::Arc;

use tracing::debug;

use super::endpoints::Endpoints;
use super::http::{HttpClient, HttpError};
use crate::version::Version;

/// Reader for per-version README files.
pub struct DocsClient<C: HttpClient> {
    client: Arc<C>,
    endpoints: Endpoints,
}

impl<C: HttpClient> DocsClient<C> {
    /// Create a documentation client.
    pub fn new(client: Arc<C>, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Fetch the README for `version`.
    ///
    /// Returns `Ok(None)` when the store answers with any non-success status,
    /// and an error only when the request itself failed.
    pub fn readme(&self, version: &Version) -> Result<Option<String>, HttpError> {
        let url = self.endpoints.readme_url(version);
        match self.client.get(&url) {
            Ok(body) => Ok(Some(normalize_text(&String::from_utf8_lossy(&body)))),
            Err(HttpError::Status { status, .. }) => {
                debug!(%url, status, "README not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Undo literal escape sequences left in uploaded text.
pub fn normalize_text(text: &str) -> String {
    text.replace("\\u2714", "\u{2714}")
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
}
