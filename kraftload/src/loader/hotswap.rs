//! Binding one installed version as the process's live implementation.
//!
//! The loader owns a small namespace per artifact: an ordered list of
//! module search paths and at most one bound [`LoadedModule`]. Every load
//! starts by unbinding the current module and dropping every search path
//! under the artifact's storage root, so a stale version can never shadow
//! the one being loaded, even when the same version is loaded twice.
//!
//! Handles are `Arc`s. A caller that grabbed the previous handle keeps a
//! working module until it drops it; the next caller sees the new one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::error::LoadError;
use super::plugin::{DefaultPluginFactory, Operation, Plugin, PluginFactory};
use crate::store::LocalStore;
use crate::version::Version;

/// A bound, fully initialised version of the artifact.
pub struct LoadedModule {
    artifact: String,
    version: Version,
    path: PathBuf,
    generation: u64,
    plugin: Box<dyn Plugin>,
}

impl LoadedModule {
    /// Name the module is bound under.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Version this handle was loaded from.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Unit directory the module was built from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load counter value at bind time; strictly increasing per loader.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Module format (`manifest` or `native`).
    pub fn kind(&self) -> &'static str {
        self.plugin.kind()
    }

    /// Operations the module exports.
    pub fn exports(&self) -> Vec<Operation> {
        self.plugin.exports()
    }

    /// Invoke an operation; `None` if this version does not export it.
    pub fn call(&self, op: Operation, a: f64, b: f64) -> Option<f64> {
        self.plugin.call(op, a, b)
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("artifact", &self.artifact)
            .field("version", &self.version.as_str())
            .field("path", &self.path)
            .field("generation", &self.generation)
            .field("kind", &self.plugin.kind())
            .finish()
    }
}

#[derive(Default)]
struct Namespace {
    search_paths: Vec<PathBuf>,
    bound: Option<Arc<LoadedModule>>,
}

/// Loads installed versions and keeps exactly one bound.
pub struct HotSwapLoader<F: PluginFactory = DefaultPluginFactory> {
    artifact: String,
    store: LocalStore,
    factory: F,
    namespace: RwLock<Namespace>,
    generation: AtomicU64,
}

impl HotSwapLoader<DefaultPluginFactory> {
    /// Create a loader for `artifact` backed by `store`.
    pub fn new(artifact: impl Into<String>, store: LocalStore) -> Self {
        Self::with_factory(artifact, store, DefaultPluginFactory)
    }
}

impl<F: PluginFactory> HotSwapLoader<F> {
    /// Create a loader using a custom plugin factory.
    pub fn with_factory(artifact: impl Into<String>, store: LocalStore, factory: F) -> Self {
        Self {
            artifact: artifact.into(),
            store,
            factory,
            namespace: RwLock::new(Namespace::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Append a fallback search path, consulted after the version directory.
    pub fn with_search_path(self, path: impl Into<PathBuf>) -> Self {
        self.namespace.write().search_paths.push(path.into());
        self
    }

    /// Artifact name this loader binds.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Bind `version`, replacing whatever is bound.
    ///
    /// On failure nothing is bound and no path under the storage root is
    /// left on the search list.
    pub fn load(&self, version: &Version) -> Result<Arc<LoadedModule>, LoadError> {
        let mut ns = self.namespace.write();

        if let Some(old) = self.unbind(&mut ns) {
            debug!(
                artifact = %self.artifact,
                version = %old.version(),
                generation = old.generation(),
                "Unbound module"
            );
        }

        let version_dir = self.store.version_dir(version);
        if !version_dir.is_dir() {
            return Err(LoadError::NotInstalled {
                version: version.to_string(),
                path: version_dir,
            });
        }

        ns.search_paths.insert(0, version_dir.clone());

        match self.resolve(&ns.search_paths, version) {
            Ok((unit_dir, plugin)) => {
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                let module = Arc::new(LoadedModule {
                    artifact: self.artifact.clone(),
                    version: version.clone(),
                    path: unit_dir,
                    generation,
                    plugin,
                });
                info!(
                    artifact = %self.artifact,
                    version = %version,
                    kind = module.kind(),
                    generation,
                    "Loaded module"
                );
                ns.bound = Some(Arc::clone(&module));
                Ok(module)
            }
            Err(reason) => {
                ns.search_paths.retain(|p| p != &version_dir);
                Err(LoadError::InitFailed {
                    version: version.to_string(),
                    reason,
                })
            }
        }
    }

    /// The bound module, if any.
    pub fn current(&self) -> Option<Arc<LoadedModule>> {
        self.namespace.read().bound.clone()
    }

    /// Drop the bound module and its search path.
    pub fn unload(&self) -> Option<Arc<LoadedModule>> {
        let mut ns = self.namespace.write();
        self.unbind(&mut ns)
    }

    /// Current search path list, highest priority first.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.namespace.read().search_paths.clone()
    }

    /// Number of modules bound under the artifact name (0 or 1).
    pub fn bound_count(&self) -> usize {
        usize::from(self.namespace.read().bound.is_some())
    }

    fn unbind(&self, ns: &mut Namespace) -> Option<Arc<LoadedModule>> {
        let root = self.store.artifact_root();
        ns.search_paths.retain(|p| !p.starts_with(root));
        ns.bound.take()
    }

    fn resolve(
        &self,
        search_paths: &[PathBuf],
        version: &Version,
    ) -> Result<(PathBuf, Box<dyn Plugin>), String> {
        let unit_dir = search_paths
            .iter()
            .map(|p| p.join(&self.artifact))
            .find(|p| p.is_dir())
            .ok_or_else(|| {
                format!(
                    "module '{}' not found for version {} in {} search path(s)",
                    self.artifact,
                    version,
                    search_paths.len()
                )
            })?;

        debug!(path = %unit_dir.display(), "Resolved module directory");
        let plugin = self.factory.load(&self.artifact, &unit_dir)?;
        Ok((unit_dir, plugin))
    }
}
