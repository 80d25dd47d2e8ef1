//! Shared fixtures: an in-memory object store behind the `HttpClient` seam.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use kraftload::catalog::{Endpoints, HttpClient, HttpError};
use kraftload::manager::{LifecycleController, ManagerConfig};
use kraftload::version::Version;

pub const ARTIFACT: &str = "math_module";

pub const MATH_MANIFEST: &str = "[module]\nname = math_module\n\n[exports]\nadd = a + b\nsubtract = a - b\nmultiply = a * b\n";

/// Object store double serving a catalog listing, archives and READMEs.
pub struct FakeStore {
    endpoints: Endpoints,
    versions: Mutex<Vec<String>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    catalog_down: Mutex<bool>,
    requests: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            versions: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            catalog_down: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Publish a well-formed archive for `version` with `manifest`.
    pub fn publish(&self, version: &str, manifest: &str) {
        let archive = build_archive(manifest);
        self.publish_bytes(version, archive);
    }

    /// Publish a version whose archive is cut off halfway.
    pub fn publish_truncated(&self, version: &str) {
        let mut archive = build_archive(MATH_MANIFEST);
        archive.truncate(archive.len() / 2);
        self.publish_bytes(version, archive);
    }

    /// List a version in the catalog without uploading an archive.
    pub fn list_only(&self, version: &str) {
        self.versions.lock().push(version.to_string());
    }

    pub fn publish_readme(&self, version: &str, text: &str) {
        let url = self.endpoints.readme_url(&v(version));
        self.objects.lock().insert(url, text.as_bytes().to_vec());
    }

    pub fn set_catalog_down(&self, down: bool) {
        *self.catalog_down.lock() = down;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn publish_bytes(&self, version: &str, archive: Vec<u8>) {
        let url = self.endpoints.archive_url(&v(version));
        self.objects.lock().insert(url, archive);
        self.versions.lock().push(version.to_string());
    }

    fn listing(&self) -> Vec<u8> {
        let prefixes: Vec<String> = self
            .versions
            .lock()
            .iter()
            .map(|v| format!("{}/{}/", ARTIFACT, v))
            .collect();
        serde_json::json!({ "kind": "storage#objects", "prefixes": prefixes })
            .to_string()
            .into_bytes()
    }
}

impl HttpClient for FakeStore {
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        self.requests.lock().push(url.to_string());

        if url == self.endpoints.catalog_url() {
            if *self.catalog_down.lock() {
                return Err(HttpError::Transport {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            return Ok(self.listing());
        }

        self.objects
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| HttpError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A controller over a fresh storage root and an empty fake store.
pub struct Fixture {
    pub temp: TempDir,
    pub store: Arc<FakeStore>,
    pub controller: LifecycleController<FakeStore>,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let config = ManagerConfig::new(ARTIFACT, temp.path().join("packages"))
            .with_base_url("http://objects.test")
            .with_bucket("kraft-packages");
        let store = Arc::new(FakeStore::new(config.endpoints()));
        let controller = LifecycleController::with_client(config, Arc::clone(&store));
        Self {
            temp,
            store,
            controller,
        }
    }

    /// Publish `version` and install it through `update`.
    pub fn install(&self, version: &str) {
        self.store.publish(version, MATH_MANIFEST);
        let installed = self.controller.update().expect("update");
        assert_eq!(installed.as_str(), version);
    }

    pub fn artifact_root(&self) -> &Path {
        self.controller.store().artifact_root()
    }
}

pub fn v(s: &str) -> Version {
    Version::parse(s).expect("valid version")
}

/// Build a tar.gz holding `math_module/module.ini`.
pub fn build_archive(manifest: &str) -> Vec<u8> {
    let work = TempDir::new().expect("temp dir");
    let unit = work.path().join("tree").join(ARTIFACT);
    fs::create_dir_all(&unit).expect("create unit dir");
    fs::write(unit.join("module.ini"), manifest).expect("write manifest");

    let archive = work.path().join("out.tar.gz");
    let status = Command::new("tar")
        .arg("-czf")
        .arg(&archive)
        .arg("-C")
        .arg(work.path().join("tree"))
        .arg(ARTIFACT)
        .status()
        .expect("run tar");
    assert!(status.success(), "tar failed");

    fs::read(&archive).expect("read archive")
}
