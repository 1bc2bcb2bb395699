//! Error types for registry lookups, registration and export.

use thiserror::Error;

/// Errors returned by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Read of a name that was never registered.
    #[error("config item not found: {0}")]
    NotFound(String),
    /// Env export requested for a category without a registered prefix.
    #[error("no env var prefix registered for category: {0}")]
    MissingPrefix(String),
    /// Placement or env naming attempted on an item without a tree.
    #[error("config item has no placement tree: {0}")]
    InvalidPlacement(String),
    /// Placement would descend through a value that is not a mapping.
    #[error("cannot place {name}: segment {segment:?} already holds a non-mapping value")]
    PlacementConflict { name: String, segment: String },
    /// A placement tree with no segments.
    #[error("placement tree for {0} must contain at least one segment")]
    EmptyTree(String),
    /// A bulk registration row could not be turned into an item.
    #[error("invalid bulk entry {index} in category {category}: {reason}")]
    InvalidBulkEntry {
        category: String,
        index: usize,
        reason: String,
    },
    /// A manifest document has the wrong shape.
    #[error("invalid manifest at {path}: {message}")]
    InvalidManifest { path: String, message: String },
    /// Parsing a JSON5 manifest failed.
    #[error("failed to parse manifest: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting a value through serde failed.
    #[error("failed to serialize value: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}
