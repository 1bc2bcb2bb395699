//! A single named configuration entry and its placement logic.

use crate::value::{ConfigValue, Primitive};
use crate::{RegistryError, TreePath};
use serde::Serialize;
use serde_json::{Map, Value};

/// One named value plus the metadata needed to export it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigItem {
    /// Identifier, unique within a registry.
    pub name: String,
    /// Grouping tag used to scope exports and env var prefixes.
    pub category: String,
    /// Current value.
    pub default: ConfigValue,
    /// Placement inside the category's structured document, if any.
    pub tree: Option<TreePath>,
}

/// Serializable view of a [`ConfigItem`] with its default normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRecord {
    pub name: String,
    pub category: String,
    pub default: Value,
    pub tree: Option<Vec<String>>,
}

impl ConfigItem {
    /// Create a flat-only item with no placement tree.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        default: impl Primitive,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            default: default.to_primitive(),
            tree: None,
        }
    }

    /// Attach a placement tree.
    pub fn with_tree(mut self, tree: TreePath) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Whether this item takes part in structured and env var export.
    pub fn formattable(&self) -> bool {
        self.tree.is_some()
    }

    fn require_tree(&self) -> Result<&TreePath, RegistryError> {
        self.tree
            .as_ref()
            .ok_or_else(|| RegistryError::InvalidPlacement(self.name.clone()))
    }

    /// Place the default into `doc` at this item's tree.
    ///
    /// Intermediate mappings are created as needed; an existing leaf is
    /// replaced.
    pub fn update_json(&self, doc: &mut Map<String, Value>) -> Result<(), RegistryError> {
        let tree = self.require_tree()?;
        place(doc, &self.name, tree, self.default.to_json())
    }

    /// Env var name for this item under `prefix`, e.g. `APP__db__host`.
    pub fn to_env_var(&self, prefix: &str) -> Result<String, RegistryError> {
        Ok(self.require_tree()?.env_var_name(prefix))
    }

    pub fn to_dict(&self) -> ItemRecord {
        ItemRecord {
            name: self.name.clone(),
            category: self.category.clone(),
            default: self.default.to_json(),
            tree: self.tree.as_ref().map(|tree| tree.segments().to_vec()),
        }
    }
}

/// Walk `tree` inside `doc`, creating mappings, and set the leaf to `value`.
pub(crate) fn place(
    doc: &mut Map<String, Value>,
    name: &str,
    tree: &TreePath,
    value: Value,
) -> Result<(), RegistryError> {
    let (parents, leaf) = tree.split_leaf();
    let mut cursor = doc;
    for segment in parents {
        let entry = cursor
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        cursor = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(RegistryError::PlacementConflict {
                    name: name.to_string(),
                    segment: segment.clone(),
                });
            }
        };
    }
    // A scalar must not swallow a subtree placed by another item.
    if matches!(cursor.get(leaf), Some(Value::Object(_))) && !value.is_object() {
        return Err(RegistryError::PlacementConflict {
            name: name.to_string(),
            segment: leaf.to_string(),
        });
    }
    cursor.insert(leaf.to_string(), value);
    Ok(())
}
