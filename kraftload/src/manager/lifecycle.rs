//! The user-facing lifecycle of one artifact: status, update, rollback and
//! delegation to whatever version is currently loaded.
//!
//! ```text
//! {Absent} --update--> {Installed(v)} --update--> {Installed(v'), keeps v}
//!                                     <-rollback- (v' deleted)
//! ```
//!
//! Update, rollback and first-use loads hold the artifact lock for their
//! whole duration. Status never takes it: it reads the store and the catalog
//! independently and tolerates either changing underneath it.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::ManagerConfig;
use super::download::ArtifactDownloader;
use super::error::{ManagerError, ManagerResult};
use super::extractor::Installer;
use crate::catalog::{DocsClient, HttpClient, RemoteCatalog, ReqwestClient};
use crate::loader::{DefaultPluginFactory, HotSwapLoader, LoadedModule, Operation, PluginFactory};
use crate::store::LocalStore;
use crate::version::Version;

/// Snapshot of what is installed versus what is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub artifact: String,
    pub installed: Option<Version>,
    pub latest: Option<Version>,
    pub previous: Option<Version>,
    pub update_available: bool,
    pub rollback_available: bool,
}

impl ArtifactStatus {
    /// Derive the flags from the three versions.
    ///
    /// An empty catalog reports no previous version and no affordances at
    /// all, even when versions are installed locally.
    pub fn derive(
        artifact: impl Into<String>,
        installed: Option<Version>,
        latest: Option<Version>,
        previous: Option<Version>,
    ) -> Self {
        let artifact = artifact.into();
        let Some(latest) = latest else {
            return Self {
                artifact,
                installed,
                latest: None,
                previous: None,
                update_available: false,
                rollback_available: false,
            };
        };

        let update_available = match &installed {
            None => true,
            Some(current) => Version::compare(&latest, current) == Ordering::Greater,
        };
        let rollback_available = previous.is_some();

        Self {
            artifact,
            installed,
            latest: Some(latest),
            previous,
            update_available,
            rollback_available,
        }
    }
}

/// Orchestrates catalog, store, fetcher and loader for one artifact.
pub struct LifecycleController<C: HttpClient = ReqwestClient, F: PluginFactory = DefaultPluginFactory>
{
    config: ManagerConfig,
    store: LocalStore,
    catalog: RemoteCatalog<C>,
    docs: DocsClient<C>,
    downloader: ArtifactDownloader<C>,
    installer: Installer,
    loader: HotSwapLoader<F>,
    lock: Mutex<()>,
}

impl LifecycleController<ReqwestClient> {
    /// Create a controller talking to the configured object store.
    pub fn new(config: ManagerConfig) -> ManagerResult<Self> {
        let client = ReqwestClient::with_timeout(config.timeout).map_err(|e| {
            ManagerError::FetchFailed {
                url: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::with_client(config, Arc::new(client)))
    }
}

impl<C: HttpClient> LifecycleController<C> {
    /// Create a controller with a custom HTTP client.
    pub fn with_client(config: ManagerConfig, client: Arc<C>) -> Self {
        Self::with_factory(config, client, DefaultPluginFactory)
    }
}

impl<C: HttpClient, F: PluginFactory> LifecycleController<C, F> {
    /// Create a controller with a custom HTTP client and plugin factory.
    pub fn with_factory(config: ManagerConfig, client: Arc<C>, factory: F) -> Self {
        let store = LocalStore::new(&config.storage_dir, &config.artifact);
        let endpoints = config.endpoints();

        let mut loader = HotSwapLoader::with_factory(&config.artifact, store.clone(), factory);
        for path in &config.search_paths {
            loader = loader.with_search_path(path);
        }

        Self {
            catalog: RemoteCatalog::new(Arc::clone(&client), endpoints.clone()),
            docs: DocsClient::new(Arc::clone(&client), endpoints.clone()),
            downloader: ArtifactDownloader::new(client, endpoints, store.clone()),
            installer: Installer::new(store.clone()).with_keep_archives(config.keep_archives),
            loader,
            store,
            config,
            lock: Mutex::new(()),
        }
    }

    /// Configuration the controller was built from.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Local store of installed versions.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Loader holding the bound module.
    pub fn loader(&self) -> &HotSwapLoader<F> {
        &self.loader
    }

    /// Installed versus published versions. Never fails.
    pub fn status(&self) -> ArtifactStatus {
        let local = self.store.snapshot();
        let latest = self.catalog.latest();

        ArtifactStatus::derive(
            &self.config.artifact,
            local.installed().cloned(),
            latest,
            local.previous().cloned(),
        )
    }

    /// Install and load the latest published version.
    pub fn update(&self) -> ManagerResult<Version> {
        let _guard = self.lock.lock();

        let latest = self.catalog.latest().ok_or(ManagerError::NothingToUpdate)?;
        info!(artifact = %self.config.artifact, version = %latest, "Updating");

        let archive = self.downloader.fetch(&latest)?;
        self.installer.extract(&archive, &latest)?;
        self.loader.load(&latest)?;

        info!(artifact = %self.config.artifact, version = %latest, "Update complete");
        Ok(latest)
    }

    /// Load the previous installed version, then delete the newer one.
    ///
    /// If the previous version fails to load, the installed version is bound
    /// again and nothing is deleted.
    pub fn rollback(&self) -> ManagerResult<Version> {
        let _guard = self.lock.lock();

        let local = self.store.snapshot();
        let (installed, previous) = match (local.installed(), local.previous()) {
            (Some(installed), Some(previous)) => (installed.clone(), previous.clone()),
            _ => return Err(ManagerError::NothingToRollback),
        };
        info!(
            artifact = %self.config.artifact,
            from = %installed,
            to = %previous,
            "Rolling back"
        );

        if let Err(e) = self.loader.load(&previous) {
            warn!(version = %previous, error = %e, "Previous version failed to load, keeping installed");
            if let Err(restore) = self.loader.load(&installed) {
                warn!(version = %installed, error = %restore, "Failed to re-bind installed version");
            }
            return Err(e.into());
        }

        self.store.remove_version(&installed)?;

        info!(artifact = %self.config.artifact, version = %previous, "Rollback complete");
        Ok(previous)
    }

    /// The bound module, loading the installed version on first use.
    ///
    /// A bound version whose directory has since disappeared is replaced by
    /// whatever is installed now.
    pub fn ensure_loaded(&self) -> ManagerResult<Arc<LoadedModule>> {
        if let Some(module) = self.loader.current() {
            if self.store.contains(module.version()) {
                return Ok(module);
            }
        }

        let _guard = self.lock.lock();

        // another caller may have loaded while we waited
        if let Some(module) = self.loader.current() {
            if self.store.contains(module.version()) {
                return Ok(module);
            }
            debug!(version = %module.version(), "Bound version vanished from disk");
        }

        let installed =
            self.store
                .installed_version()
                .ok_or_else(|| ManagerError::NothingInstalled {
                    artifact: self.config.artifact.clone(),
                })?;

        Ok(self.loader.load(&installed)?)
    }

    /// Version currently bound, if any.
    pub fn current_version(&self) -> Option<Version> {
        self.loader.current().map(|m| m.version().clone())
    }

    /// Run `op` on textual inputs.
    pub fn compute(&self, op: &str, a: &str, b: &str) -> ManagerResult<f64> {
        let op = op.parse::<Operation>().map_err(ManagerError::InvalidArgument)?;
        let a = parse_operand(a)?;
        let b = parse_operand(b)?;
        self.compute_values(op, a, b)
    }

    /// Run `op` on the loaded version.
    pub fn compute_values(&self, op: Operation, a: f64, b: f64) -> ManagerResult<f64> {
        if !a.is_finite() || !b.is_finite() {
            return Err(ManagerError::InvalidArgument(
                "operands must be finite numbers".to_string(),
            ));
        }

        let module = self.ensure_loaded()?;
        module
            .call(op, a, b)
            .ok_or_else(|| ManagerError::Unsupported {
                version: module.version().to_string(),
                operation: op.to_string(),
            })
    }

    /// Documentation for `version`; `None` if it has none.
    pub fn readme(&self, version: &Version) -> ManagerResult<Option<String>> {
        self.docs.readme(version).map_err(ManagerError::DocsFailed)
    }

    /// Published versions, ascending. Empty when the catalog is unreachable.
    pub fn available_versions(&self) -> Vec<Version> {
        self.catalog.list_versions()
    }

    /// Installed versions, ascending.
    pub fn installed_versions(&self) -> Vec<Version> {
        self.store.snapshot().all().to_vec()
    }
}

fn parse_operand(input: &str) -> ManagerResult<f64> {
    let value = input
        .trim()
        .parse::<f64>()
        .map_err(|_| ManagerError::InvalidArgument(format!("'{}' is not a number", input)))?;
    if !value.is_finite() {
        return Err(ManagerError::InvalidArgument(format!(
            "'{}' is not a finite number",
            input
        )));
    }
    Ok(value)
}
