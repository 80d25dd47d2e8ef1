//! Kraftload - versioned artifact lifecycle management
//!
//! This library keeps one named, remotely published artifact up to date
//! inside a running process:
//!
//! - [`catalog`] lists published versions and fetches their documentation
//! - [`store`] derives the installed and previous versions from disk
//! - [`manager`] downloads and atomically unpacks archives, and drives the
//!   status, update and rollback operations
//! - [`loader`] binds exactly one installed version as the live module
//!
//! # Example
//!
//! ```no_run
//! use kraftload::manager::{LifecycleController, ManagerConfig};
//!
//! let controller = LifecycleController::new(ManagerConfig::default())?;
//! let status = controller.status();
//! if status.update_available {
//!     controller.update()?;
//! }
//! println!("2 + 3 = {}", controller.compute("add", "2", "3")?);
//! # Ok::<(), kraftload::manager::ManagerError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod loader;
pub mod logging;
pub mod manager;
pub mod store;
pub mod version;
