//! The capability interface a loaded artifact exposes.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use super::manifest::{ManifestPlugin, MANIFEST_FILENAME};
use super::native::{native_library_filename, NativePlugin};

/// A numeric operation an artifact can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
}

impl Operation {
    /// All operations, in display order.
    pub const ALL: [Operation; 3] = [Operation::Add, Operation::Subtract, Operation::Multiply];

    /// Export name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" | "sub" => Ok(Self::Subtract),
            "multiply" | "mul" => Ok(Self::Multiply),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

/// A fully initialised module instance.
///
/// Dropping the instance releases everything it holds (for native modules,
/// the shared library itself).
pub trait Plugin: Send + Sync {
    /// Operations this instance implements.
    fn exports(&self) -> Vec<Operation>;

    /// Invoke an exported operation; `None` if it is not exported.
    fn call(&self, op: Operation, a: f64, b: f64) -> Option<f64>;

    /// Short description of the module format, for logs.
    fn kind(&self) -> &'static str;
}

/// Builds module instances from an unpacked unit directory.
///
/// `unit_dir` is `{search_path}/{artifact}`. Errors are human-readable
/// reasons; the loader attaches the version.
pub trait PluginFactory: Send + Sync {
    fn load(&self, artifact: &str, unit_dir: &Path) -> Result<Box<dyn Plugin>, String>;
}

/// Picks the module format from what the unit directory contains.
///
/// A `module.ini` manifest wins over a native library when both exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPluginFactory;

impl PluginFactory for DefaultPluginFactory {
    fn load(&self, artifact: &str, unit_dir: &Path) -> Result<Box<dyn Plugin>, String> {
        let manifest = unit_dir.join(MANIFEST_FILENAME);
        if manifest.is_file() {
            return ManifestPlugin::load(artifact, &manifest).map(|p| Box::new(p) as Box<dyn Plugin>);
        }

        let library = unit_dir.join(native_library_filename(artifact));
        if library.is_file() {
            return NativePlugin::load(&library).map(|p| Box::new(p) as Box<dyn Plugin>);
        }

        Err(format!(
            "no entry point in {} (expected {} or {})",
            unit_dir.display(),
            MANIFEST_FILENAME,
            native_library_filename(artifact).to_string_lossy()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_operation_from_str() {
        assert_eq!("add".parse::<Operation>(), Ok(Operation::Add));
        assert_eq!("Multiply".parse::<Operation>(), Ok(Operation::Multiply));
        assert_eq!("sub".parse::<Operation>(), Ok(Operation::Subtract));
        assert!("divide".parse::<Operation>().is_err());
    }

    #[test]
    fn test_operation_display() {
        let names: Vec<String> = Operation::ALL.iter().map(|o| o.to_string()).collect();
        assert_eq!(names, vec!["add", "subtract", "multiply"]);
    }

    #[test]
    fn test_default_factory_prefers_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILENAME), "[exports]\nadd = a + b\n").unwrap();
        fs::write(temp.path().join(native_library_filename("math_module")), b"junk").unwrap();

        let plugin = DefaultPluginFactory.load("math_module", temp.path()).unwrap();
        assert_eq!(plugin.kind(), "manifest");
        assert_eq!(plugin.call(Operation::Add, 2.0, 3.0), Some(5.0));
    }

    #[test]
    fn test_default_factory_missing_entry_point() {
        let temp = TempDir::new().unwrap();
        let err = DefaultPluginFactory
            .load("math_module", temp.path())
            .err()
            .unwrap();
        assert!(err.contains("no entry point"));
    }

    #[test]
    fn test_default_factory_rejects_invalid_library() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(native_library_filename("math_module")), b"junk").unwrap();

        assert!(DefaultPluginFactory.load("math_module", temp.path()).is_err());
    }
}
