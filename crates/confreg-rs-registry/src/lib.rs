//! Configuration registry with structured and env var export.
//!
//! This crate holds named configuration defaults grouped by category, lets
//! callers read and override them by name, and exports them as nested JSON,
//! env var assignments, or a combined dump. It performs no file or
//! environment I/O of its own.

mod error;
mod item;
mod manifest;
mod registry;
mod tree;
mod value;

/// Public error type returned by registry operations.
pub use error::RegistryError;
/// Config entries and their serializable record view.
pub use item::{ConfigItem, ItemRecord};
/// JSON5 registration manifests.
pub use manifest::{CategoryManifest, Manifest};
/// The registry, its bulk entries and combined dump.
pub use registry::{BulkEntry, Registry, RegistryDump, UNKNOWN_CATEGORY};
/// Placement paths.
pub use tree::{ENV_VAR_SEPARATOR, TreePath};
/// Value model and normalization.
pub use value::{ConfigValue, Primitive, primitive};
