//! Bulk registration entries.

use crate::value::{ConfigValue, Primitive};
use crate::{ConfigItem, RegistryError, TreePath};

/// One `(name, default)` or `(name, default, tree)` registration row.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    name: String,
    default: ConfigValue,
    tree: Option<Vec<String>>,
}

impl BulkEntry {
    /// Flat-only entry.
    pub fn new(name: impl Into<String>, default: impl Primitive) -> Self {
        Self {
            name: name.into(),
            default: default.to_primitive(),
            tree: None,
        }
    }

    /// Entry placed at `tree`.
    pub fn placed<I, S>(name: impl Into<String>, default: impl Primitive, tree: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            default: default.to_primitive(),
            tree: Some(tree.into_iter().map(Into::into).collect()),
        }
    }

    /// Decode an untyped row, checking its arity and field kinds.
    pub(crate) fn from_row(
        category: &str,
        index: usize,
        row: Vec<ConfigValue>,
    ) -> Result<Self, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidBulkEntry {
            category: category.to_string(),
            index,
            reason,
        };

        let (name, default, tree) = match row.len() {
            2 | 3 => {
                let mut fields = row.into_iter();
                (fields.next(), fields.next(), fields.next())
            }
            arity => return Err(invalid(format!("expected 2 or 3 fields, got {arity}"))),
        };

        let name = match name {
            Some(ConfigValue::String(name)) => name,
            other => {
                return Err(invalid(format!(
                    "name must be a string, got {}",
                    other.unwrap_or_default().to_json()
                )));
            }
        };

        let tree = match tree {
            None | Some(ConfigValue::Null) => None,
            Some(ConfigValue::Sequence(segments)) => Some(
                segments
                    .into_iter()
                    .map(|segment| match segment {
                        ConfigValue::String(segment) => Ok(segment),
                        other => Err(invalid(format!(
                            "tree segments must be strings, got {}",
                            other.to_json()
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(other) => {
                return Err(invalid(format!(
                    "tree must be a list of strings, got {}",
                    other.to_json()
                )));
            }
        };

        Ok(Self {
            name,
            default: default.unwrap_or_default(),
            tree,
        })
    }

    pub(crate) fn into_item(self, category: &str, index: usize) -> Result<ConfigItem, RegistryError> {
        let item = ConfigItem::new(self.name, category, self.default);
        match self.tree {
            None => Ok(item),
            Some(segments) => {
                let tree = TreePath::new(&item.name, segments).map_err(|err| {
                    RegistryError::InvalidBulkEntry {
                        category: category.to_string(),
                        index,
                        reason: err.to_string(),
                    }
                })?;
                Ok(item.with_tree(tree))
            }
        }
    }
}

impl<N, V> From<(N, V)> for BulkEntry
where
    N: Into<String>,
    V: Primitive,
{
    fn from((name, default): (N, V)) -> Self {
        BulkEntry::new(name, default)
    }
}

impl<N, V, T, S> From<(N, V, T)> for BulkEntry
where
    N: Into<String>,
    V: Primitive,
    T: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from((name, default, tree): (N, V, T)) -> Self {
        BulkEntry::placed(name, default, tree)
    }
}
