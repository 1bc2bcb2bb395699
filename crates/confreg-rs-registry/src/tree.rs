//! Placement paths for structured and env var export.

use crate::RegistryError;
use serde::Serialize;
use std::fmt;

/// Separator placed between the prefix and each segment of an env var name.
pub const ENV_VAR_SEPARATOR: &str = "__";

/// Non-empty ordered list of path segments locating a value in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// Build a path, rejecting an empty segment list.
    ///
    /// `owner` names the item the path belongs to and only feeds the error.
    pub fn new<I, S>(owner: &str, segments: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(RegistryError::EmptyTree(owner.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Split into the intermediate segments and the final key.
    pub fn split_leaf(&self) -> (&[String], &str) {
        match self.0.split_last() {
            Some((leaf, parents)) => (parents, leaf),
            // Unreachable: `new` rejects empty paths.
            None => (&[], ""),
        }
    }

    /// Env var name: the prefix followed by each segment, joined by `__`.
    pub fn env_var_name(&self, prefix: &str) -> String {
        let mut name = prefix.to_string();
        for segment in &self.0 {
            name.push_str(ENV_VAR_SEPARATOR);
            name.push_str(segment);
        }
        name
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
