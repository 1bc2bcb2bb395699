//! In-memory registry of named configuration items.
//!
//! Items are registered per category, read and overridden by name, and
//! exported as structured JSON, env var assignments, or a combined dump.

mod bulk;


pub use bulk::BulkEntry;

use crate::item::place;
use crate::value::{ConfigValue, Primitive};
use crate::{ConfigItem, RegistryError};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Category assigned to items created implicitly by [`Registry::set`].
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Name-keyed store of config items plus per-category env var prefixes.
///
/// Not synchronized; wrap it in a mutex to share it across threads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    storage: BTreeMap<String, ConfigItem>,
    env_vars: BTreeMap<String, String>,
}

/// Combined export returned by [`Registry::to_dict`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryDump {
    /// Name to normalized default, for every item.
    pub flat: Map<String, Value>,
    /// Category to name to normalized default, for every item.
    pub by_category: BTreeMap<String, Map<String, Value>>,
    /// Category to nested document built from placed, non-null items.
    pub structured: BTreeMap<String, Map<String, Value>>,
    /// Category to env var prefix.
    pub env_var_prefixes: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current default for `name`.
    ///
    /// Unlike [`Registry::set`], reading never creates an item: unknown names
    /// fail with [`RegistryError::NotFound`].
    pub fn get(&self, name: &str) -> Result<&ConfigValue, RegistryError> {
        self.storage
            .get(name)
            .map(|item| &item.default)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Override the default for `name`.
    ///
    /// Unknown names are created on the fly in the [`UNKNOWN_CATEGORY`]
    /// category with no tree, so a typo here silently registers a new item
    /// instead of failing like [`Registry::get`] does.
    pub fn set(&mut self, name: &str, value: impl Primitive) {
        let value = value.to_primitive();
        match self.storage.get_mut(name) {
            Some(item) => item.default = value,
            None => {
                debug!("creating config item on write (name={name}, category={UNKNOWN_CATEGORY})");
                self.storage.insert(
                    name.to_string(),
                    ConfigItem::new(name, UNKNOWN_CATEGORY, value),
                );
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.storage.contains_key(name)
    }

    /// Store `item` under its name, replacing any previous item.
    pub fn insert(&mut self, item: ConfigItem) {
        if let Some(previous) = self.storage.insert(item.name.clone(), item) {
            debug!(
                "replaced config item (name={}, category={})",
                previous.name, previous.category
            );
        }
    }

    /// Register a batch of items under `category`.
    ///
    /// When `env_var` is given it becomes the env var prefix for the
    /// category. Every entry is validated before any is inserted, so a
    /// failing batch leaves the registry untouched.
    pub fn bulk_add<I, E>(
        &mut self,
        category: &str,
        items: I,
        env_var: Option<&str>,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = E>,
        E: Into<BulkEntry>,
    {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into().into_item(category, index))
            .collect::<Result<Vec<_>, _>>()?;
        self.register(category, items, env_var);
        Ok(())
    }

    /// Register untyped rows of `[name, default]` or `[name, default, tree]`.
    ///
    /// Rows of any other length fail with [`RegistryError::InvalidBulkEntry`].
    pub fn bulk_add_values<I>(
        &mut self,
        category: &str,
        rows: I,
        env_var: Option<&str>,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Vec<ConfigValue>>,
    {
        let items = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                BulkEntry::from_row(category, index, row)?.into_item(category, index)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.register(category, items, env_var);
        Ok(())
    }

    fn register(&mut self, category: &str, items: Vec<ConfigItem>, env_var: Option<&str>) {
        if let Some(prefix) = env_var {
            self.set_env_prefix(category, prefix);
        }
        debug!(
            "registering config items (category={category}, count={}, env_var_set={})",
            items.len(),
            env_var.is_some()
        );
        for item in items {
            self.insert(item);
        }
    }

    /// Apply [`Registry::set`] for each pair; returns the registry for chaining.
    pub fn overwrite<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Primitive,
    {
        for (name, value) in pairs {
            self.set(name.as_ref(), value);
        }
        self
    }

    /// Place every non-null item of `category` into `doc`.
    ///
    /// Items without a tree fail with [`RegistryError::InvalidPlacement`].
    /// On any error `doc` is left exactly as it was passed in.
    pub fn to_json(&self, category: &str, doc: &mut Map<String, Value>) -> Result<(), RegistryError> {
        let mut staged = doc.clone();
        for item in self.items_in(category).filter(|item| !item.default.is_null()) {
            item.update_json(&mut staged)?;
        }
        *doc = staged;
        Ok(())
    }

    /// Env var name to stringified default for placed, non-null items.
    pub fn to_env_var_dict(&self, category: &str) -> Result<BTreeMap<String, String>, RegistryError> {
        let prefix = self
            .env_prefix(category)
            .ok_or_else(|| RegistryError::MissingPrefix(category.to_string()))?;
        let mut vars = BTreeMap::new();
        for item in self.items_in(category) {
            let Some(tree) = item.tree.as_ref() else {
                continue;
            };
            if item.default.is_null() {
                continue;
            }
            vars.insert(tree.env_var_name(prefix), item.default.to_string());
        }
        Ok(vars)
    }

    /// Flat, per-category, structured and prefix views in one value.
    ///
    /// Every category with at least one item appears in `structured`, as an
    /// empty mapping when none of its items are placed.
    pub fn to_dict(&self) -> Result<RegistryDump, RegistryError> {
        let mut flat = Map::new();
        let mut by_category: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
        let mut structured: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

        for item in self.storage.values() {
            let value = item.default.to_json();
            flat.insert(item.name.clone(), value.clone());
            by_category
                .entry(item.category.clone())
                .or_default()
                .insert(item.name.clone(), value.clone());

            let doc = structured.entry(item.category.clone()).or_default();
            if let Some(tree) = item.tree.as_ref()
                && !item.default.is_null()
            {
                place(doc, &item.name, tree, value)?;
            }
        }

        info!(
            "exported registry (items={}, categories={})",
            flat.len(),
            by_category.len()
        );
        Ok(RegistryDump {
            flat,
            by_category,
            structured,
            env_var_prefixes: self.env_vars.clone(),
        })
    }

    /// Record `prefix` as the env var prefix for `category`.
    pub fn set_env_prefix(&mut self, category: &str, prefix: &str) {
        self.env_vars
            .insert(category.to_string(), prefix.to_string());
    }

    pub fn env_prefix(&self, category: &str) -> Option<&str> {
        self.env_vars.get(category).map(String::as_str)
    }

    pub fn item(&self, name: &str) -> Option<&ConfigItem> {
        self.storage.get(name)
    }

    /// All items, ordered by name.
    pub fn items(&self) -> impl Iterator<Item = &ConfigItem> {
        self.storage.values()
    }

    /// Items tagged with `category`, ordered by name.
    pub fn items_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ConfigItem> + 'a {
        self.storage
            .values()
            .filter(move |item| item.category == category)
    }

    /// Distinct categories of registered items, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.storage
            .values()
            .map(|item| item.category.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}
