//! JSON5 manifests describing bulk registrations.
//!
//! A manifest groups registration rows by category and may carry overrides:
//!
//! ```json5
//! {
//!   categories: {
//!     net: {
//!       env_var: "MYAPP",
//!       items: [
//!         ["host", "localhost", ["net", "host"]],
//!         ["debug", false],
//!       ],
//!     },
//!   },
//!   overrides: { host: "example.org" },
//! }
//! ```
//!
//! Reading the document from disk is left to the caller.

use crate::{ConfigValue, Registry, RegistryError};
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Parsed registration manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Category name to its rows and optional prefix.
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryManifest>,
    /// Name to value overrides applied after registration.
    #[serde(default)]
    pub overrides: BTreeMap<String, ConfigValue>,
}

/// Rows registered under one category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryManifest {
    #[serde(default)]
    pub env_var: Option<String>,
    /// `[name, default]` or `[name, default, tree]` rows.
    #[serde(default)]
    pub items: Vec<Vec<ConfigValue>>,
}

impl Manifest {
    /// Parse and validate a manifest from JSON5 contents.
    pub fn from_json5(contents: &str) -> Result<Self, RegistryError> {
        debug!("parsing manifest (len={})", contents.len());
        let manifest: Manifest = json5::from_str(contents)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for (category, spec) in &self.categories {
            if category.trim().is_empty() {
                return Err(RegistryError::InvalidManifest {
                    path: "categories".to_string(),
                    message: "category names must not be empty".to_string(),
                });
            }
            if spec.env_var.as_deref().is_some_and(|prefix| prefix.is_empty()) {
                return Err(RegistryError::InvalidManifest {
                    path: format!("categories.{category}.env_var"),
                    message: "env var prefix must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Register every category (in name order), then apply the overrides.
    ///
    /// Categories registered before a failing one stay registered.
    pub fn apply(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        for (category, spec) in &self.categories {
            registry.bulk_add_values(category, spec.items.iter().cloned(), spec.env_var.as_deref())?;
        }
        registry.overwrite(&self.overrides);
        info!(
            "applied manifest (categories={}, overrides={})",
            self.categories.len(),
            self.overrides.len()
        );
        Ok(())
    }
}

impl Registry {
    /// Build a registry from JSON5 manifest contents.
    pub fn from_manifest_str(contents: &str) -> Result<Self, RegistryError> {
        let mut registry = Registry::new();
        Manifest::from_json5(contents)?.apply(&mut registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Manifest rows register items and overrides land last.
    #[test]
    fn manifest_registers_and_overrides() {
        let registry = Registry::from_manifest_str(
            r#"{
                // comments are fine in JSON5
                categories: {
                    net: {
                        env_var: "MYAPP",
                        items: [
                            ["host", "localhost", ["net", "host"]],
                            ["port", 8080, ["net", "port"]],
                        ],
                    },
                },
                overrides: { port: 9090, extra: "x" },
            }"#,
        )
        .expect("registry");
        assert_eq!(registry.get("port").expect("port"), &ConfigValue::Int(9090));
        assert_eq!(registry.env_prefix("net"), Some("MYAPP"));
        assert_eq!(registry.len(), 3);
    }

    /// Four-element rows are rejected with their index.
    #[test]
    fn manifest_rejects_bad_arity() {
        let err = Registry::from_manifest_str(
            r#"{ categories: { net: { items: [["a", 1], ["b", 2, ["x"], "extra"]] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBulkEntry { index: 1, .. }));
    }

    /// Unknown keys fail to parse.
    #[test]
    fn manifest_rejects_unknown_keys() {
        let err = Manifest::from_json5(r#"{ categorys: {} }"#).unwrap_err();
        assert!(matches!(err, RegistryError::ParseFailed(_)));
    }

    /// Empty prefixes are caught by validation.
    #[test]
    fn manifest_rejects_empty_prefix() {
        let err = Manifest::from_json5(r#"{ categories: { net: { env_var: "" } } }"#).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("categories.net.env_var"));
    }
}
