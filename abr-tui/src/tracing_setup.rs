//! Tracing setup for the dashboard
//!
//! The terminal belongs to the UI, so logs go to a file instead of stderr.
//!
//! Usage:
//!   abr-dashboard --debug               # Debug logging
//!   RUST_LOG=abr_core=trace abr-dashboard
//!
//! Environment variables:
//!   RUST_LOG                            # Log filter (default: info)

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
}

/// Append logs to `path`, creating its directory if needed
pub fn init_tracing(config: &TracingConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = if config.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(config.debug)
        .try_init()
        .map_err(|err| anyhow!(err))
}
