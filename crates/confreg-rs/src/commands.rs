//! Subcommand execution. Each command renders its output to a string.

use crate::cli::{Cli, Command};
use anyhow::{Context, bail};
use confreg_rs_registry::{ConfigValue, Manifest, Registry};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Load manifests and overrides, then render the requested view.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let registry = load_registry(&cli.manifests, &cli.overrides)?;
    match &cli.command {
        Command::Dump { compact } => {
            let dump = registry.to_dict().context("failed to export registry")?;
            render_json(&dump, *compact)
        }
        Command::Json {
            category,
            base,
            compact,
        } => {
            let mut doc = match base.as_deref() {
                Some(path) => read_base_document(path)?,
                None => Map::new(),
            };
            registry
                .to_json(category, &mut doc)
                .with_context(|| format!("failed to place category {category}"))?;
            render_json(&Value::Object(doc), *compact)
        }
        Command::Env { category, export } => {
            let vars = registry
                .to_env_var_dict(category)
                .with_context(|| format!("failed to export env vars for {category}"))?;
            let lines: Vec<String> = vars
                .iter()
                .map(|(name, value)| {
                    if *export {
                        format!("export {name}={}", shell_quote(value))
                    } else {
                        format!("{name}={value}")
                    }
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Get { name } => {
            let value = registry.get(name)?;
            Ok(value.to_json().to_string())
        }
        Command::List { category } => {
            let rows: Vec<String> = registry
                .items()
                .filter(|item| category.as_deref().is_none_or(|c| item.category == c))
                .map(|item| {
                    let tree = item
                        .tree
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "-".to_string());
                    format!("{}\t{}\t{}", item.name, item.category, tree)
                })
                .collect();
            Ok(rows.join("\n"))
        }
    }
}

/// Build a registry from manifest files followed by command-line overrides.
pub fn load_registry(
    manifests: &[PathBuf],
    overrides: &[(String, ConfigValue)],
) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    for path in manifests {
        info!("loading manifest from path: {}", path.display());
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let manifest = Manifest::from_json5(&contents)
            .with_context(|| format!("invalid manifest {}", path.display()))?;
        manifest
            .apply(&mut registry)
            .with_context(|| format!("failed to register manifest {}", path.display()))?;
    }
    if !overrides.is_empty() {
        debug!("applying command-line overrides (count={})", overrides.len());
        registry.overwrite(overrides.iter().map(|(name, value)| (name, value)));
    }
    Ok(registry)
}

fn read_base_document(path: &Path) -> anyhow::Result<Map<String, Value>> {
    debug!("reading base document (path={})", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read base document {}", path.display()))?;
    let value: Value = json5::from_str(&contents)
        .with_context(|| format!("failed to parse base document {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "base document {} must be an object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.context("failed to render JSON")
}

/// Single-quote a value for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Embedded single quotes survive shell quoting.
    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("plain"), "'plain'");
    }
}
