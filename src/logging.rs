//! File logging. The terminal belongs to the UI, so events go to a log file
//! in the cache directory.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheManager;

/// Default filter when `RUST_LOG` is unset.
pub fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install a global subscriber appending to `log_file` inside the cache directory.
/// Returns the log path.
pub fn init_logging(cache: &CacheManager, log_file: &str, debug: bool) -> Result<PathBuf> {
    cache.ensure_cache_dir()?;
    let path = cache.cache_file(log_file);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| eyre!("Could not initialize logging: {}", e))?;

    Ok(path)
}
