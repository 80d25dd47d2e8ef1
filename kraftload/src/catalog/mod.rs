//! Remote store access: version catalog, documentation and HTTP plumbing.
//!
//! - `endpoints`: URL layout of the store for one artifact
//! - `http`: the [`HttpClient`] seam and its reqwest implementation
//! - `client`: the [`RemoteCatalog`] version listing
//! - `docs`: README pass-through

mod client;
mod docs;
mod endpoints;
pub mod http;

pub use client::{CatalogError, RemoteCatalog};
pub use docs::{normalize_text, DocsClient};
pub use endpoints::{archive_filename, Endpoints, ARCHIVE_EXTENSION, DEFAULT_BASE_URL};
pub use http::{HttpClient, HttpError, ReqwestClient};
