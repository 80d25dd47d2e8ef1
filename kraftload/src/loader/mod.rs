//! In-process module loading.
//!
//! - [`HotSwapLoader`] binds one installed version at a time
//! - [`Plugin`] is what a bound version exposes
//! - [`DefaultPluginFactory`] builds plugins from `module.ini` manifests or
//!   native shared libraries

mod error;
mod hotswap;
mod manifest;
mod native;
mod plugin;

pub use error::LoadError;
pub use hotswap::{HotSwapLoader, LoadedModule};
pub use manifest::{ManifestPlugin, MANIFEST_FILENAME};
pub use native::{
    native_library_filename, BinaryOpFn, KraftModuleV1, ModuleEntryFn, NativePlugin,
    ENTRY_SYMBOL, MODULE_ABI_VERSION,
};
pub use plugin::{DefaultPluginFactory, Operation, Plugin, PluginFactory};
