//! Entry point for the `confreg` binary.

use clap::Parser;
use confreg_rs::cli::Cli;
use confreg_rs::{commands, init_logging};
use log::info;

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(
        "starting confreg (manifests={}, overrides={})",
        cli.manifests.len(),
        cli.overrides.len()
    );
    let output = commands::run(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
