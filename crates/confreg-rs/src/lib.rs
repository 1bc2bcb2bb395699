//! Command-line front end for the configuration registry.
//!
//! This crate is the registry's caller: it reads manifest files from disk,
//! applies command-line overrides and prints the requested export view.

pub mod cli;
pub mod commands;
mod overrides;

/// Re-export for convenience.
pub use confreg_rs_registry as registry;
pub use overrides::parse_override;

#[inline]
/// Initialize logging using env_logger.
///
/// Output is controlled through `RUST_LOG`; repeated calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
