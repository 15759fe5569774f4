//! Tracing subscriber setup for the `passvault` binary.
//!
//! The library only emits events; installing a subscriber is left to
//! whoever embeds it.  The filter comes from `PASSVAULT_LOG` (same syntax
//! as `RUST_LOG`) and defaults to `warn`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::errors::{PassVaultError, Result};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PASSVAULT_LOG";

const DEFAULT_FILTER: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, logging to stderr or appending to
/// `log_file` when given.
///
/// Calling it twice is harmless: the second call leaves the first
/// subscriber in place.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter());

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| PassVaultError::io(path, e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // Err only means a subscriber already exists.
    let _ = installed;
    Ok(())
}
