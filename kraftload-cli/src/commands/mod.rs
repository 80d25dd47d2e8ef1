//! Command handlers.
//!
//! - `common`: resolving the effective configuration from file and flags
//! - `lifecycle`: status, versions, update, rollback, compute and readme
//! - `config`: config path and effective values

pub mod common;
pub mod config;
pub mod lifecycle;
