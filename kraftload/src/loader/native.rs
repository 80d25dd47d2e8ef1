//! Native modules loaded from a shared library.
//!
//! A native module is a `cdylib` named after the artifact
//! (`libmath_module.so`, `libmath_module.dylib`, `math_module.dll`) that
//! exports one C-ABI entry point:
//!
//! ```c
//! const KraftModuleV1 *kraft_module_entry(void);
//! ```
//!
//! The returned table must stay valid for as long as the library is loaded.
//! Each version lives at its own path, so the dynamic linker never hands
//! back a library loaded for a different version.

use std::ffi::OsString;
use std::path::Path;

use libloading::{Library, Symbol};

use super::plugin::{Operation, Plugin};

/// ABI version of [`KraftModuleV1`].
pub const MODULE_ABI_VERSION: u32 = 1;

/// Entry point symbol name (NUL-terminated).
pub const ENTRY_SYMBOL: &[u8] = b"kraft_module_entry\0";

/// A binary operation exported over the C ABI.
pub type BinaryOpFn = extern "C" fn(f64, f64) -> f64;

/// Function table returned by the entry point.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct KraftModuleV1 {
    pub abi_version: u32,
    pub add: Option<BinaryOpFn>,
    pub subtract: Option<BinaryOpFn>,
    pub multiply: Option<BinaryOpFn>,
}

/// Signature of the entry point.
pub type ModuleEntryFn = unsafe extern "C" fn() -> *const KraftModuleV1;

/// Platform filename of the native library for `artifact`.
pub fn native_library_filename(artifact: &str) -> OsString {
    libloading::library_filename(artifact)
}

/// A loaded native module.
///
/// The function table is copied out of the library; `_lib` keeps the code
/// it points into mapped until the plugin is dropped.
pub struct NativePlugin {
    table: KraftModuleV1,
    _lib: Library,
}

impl NativePlugin {
    /// Load a library and resolve its entry point.
    pub fn load(path: &Path) -> Result<Self, String> {
        // SAFETY: loading runs the library's initialisers; the library is an
        // artifact explicitly installed for this host.
        let lib = unsafe { Library::new(path) }
            .map_err(|e| format!("failed to load {}: {}", path.display(), e))?;

        let table = {
            // SAFETY: the symbol type matches the documented entry point ABI.
            let entry: Symbol<ModuleEntryFn> = unsafe { lib.get(ENTRY_SYMBOL) }
                .map_err(|e| format!("missing entry symbol 'kraft_module_entry': {}", e))?;

            // SAFETY: calling the entry point as documented above.
            let ptr = unsafe { entry() };
            if ptr.is_null() {
                return Err("entry point returned a null module table".to_string());
            }
            // SAFETY: non-null and valid while `lib` is loaded; copied out.
            unsafe { *ptr }
        };

        if table.abi_version != MODULE_ABI_VERSION {
            return Err(format!(
                "incompatible module ABI: host={}, module={}",
                MODULE_ABI_VERSION, table.abi_version
            ));
        }

        Ok(Self { table, _lib: lib })
    }

    fn function(&self, op: Operation) -> Option<BinaryOpFn> {
        match op {
            Operation::Add => self.table.add,
            Operation::Subtract => self.table.subtract,
            Operation::Multiply => self.table.multiply,
        }
    }
}

impl Plugin for NativePlugin {
    fn exports(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.function(*op).is_some())
            .collect()
    }

    fn call(&self, op: Operation, a: f64, b: f64) -> Option<f64> {
        self.function(op).map(|f| f(a, b))
    }

    fn kind(&self) -> &'static str {
        "native"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_library_filename_contains_artifact() {
        let name = native_library_filename("math_module");
        assert!(name.to_string_lossy().contains("math_module"));
    }

    #[test]
    fn test_load_missing_library() {
        let temp = TempDir::new().unwrap();
        let err = NativePlugin::load(&temp.path().join("libnope.so")).err().unwrap();
        assert!(err.contains("failed to load"));
    }

    #[test]
    fn test_load_garbage_library() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(native_library_filename("math_module"));
        fs::write(&path, b"this is not an object file").unwrap();

        assert!(NativePlugin::load(&path).is_err());
    }
}
