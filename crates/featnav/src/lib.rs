//! featnav library - language server and CLI plumbing around featnav-core
//!
//! This library exposes the pieces of the `featnav` binary for testing and
//! embedding purposes.

pub mod config;
pub mod lsp;
pub mod output;

use std::path::PathBuf;

use eyre::{Result, WrapErr};

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "featnav=info,featnav_core=info";

/// Find the project root by walking up from the current directory.
///
/// The first ancestor holding a featnav config file or a `.git` directory
/// wins; otherwise the current directory is used.
pub fn find_project_root() -> Result<PathBuf> {
    let start = std::env::current_dir().wrap_err("Failed to get current directory")?;
    let mut current = start.clone();

    loop {
        if current.join(config::CONFIG_PATH).exists() || current.join(".git").exists() {
            return Ok(current);
        }

        if !current.pop() {
            return Ok(start);
        }
    }
}

/// Set up logging to stderr (stdout carries the LSP protocol).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Ignore the error if a subscriber is already installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
