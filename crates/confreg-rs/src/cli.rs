//! Command-line model for the `confreg` binary.

use crate::overrides::parse_override;
use clap::{Parser, Subcommand};
use confreg_rs_registry::ConfigValue;
use std::path::PathBuf;

/// Command-line options for the config registry dumper.
#[derive(Debug, Parser)]
#[command(name = "confreg", version, about = "Inspect and export a configuration registry")]
pub struct Cli {
    /// JSON5 manifest registering config items (repeatable, applied in order)
    #[arg(long = "manifest", global = true)]
    pub manifests: Vec<PathBuf>,
    /// Override a value as NAME=VALUE; VALUE is a JSON5 literal or a raw string
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_override, global = true)]
    pub overrides: Vec<(String, ConfigValue)>,
    #[command(subcommand)]
    pub command: Command,
}

/// Export views offered by the CLI.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the combined flat/by_category/structured/env_var_prefixes dump
    Dump {
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Place a category into a JSON document and print it
    Json {
        #[arg(long)]
        category: String,
        /// Existing JSON or JSON5 object to place values into
        #[arg(long)]
        base: Option<PathBuf>,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print env var assignments for a category
    Env {
        #[arg(long)]
        category: String,
        /// Emit shell `export NAME='value'` lines
        #[arg(long)]
        export: bool,
    },
    /// Print the current value of one item as JSON
    Get { name: String },
    /// List registered items
    List {
        #[arg(long)]
        category: Option<String>,
    },
}
