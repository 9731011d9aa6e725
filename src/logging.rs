//! File-backed tracing setup. The terminal belongs to the UI, so log output
//! never goes to stdout or stderr.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Environment variable holding the log filter, e.g. `FX_LOG=fx_explorer=debug`.
pub const LOG_ENV: &str = "FX_LOG";

/// `<cache_dir>/fx/fx.log`, or `./fx.log` when there is no cache dir.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("fx").join("fx.log"))
        .unwrap_or_else(|| PathBuf::from("fx.log"))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, appending to `path`.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| crate::error::AppError::Terminal(format!("logging init failed: {e}")))?;
    Ok(())
}
