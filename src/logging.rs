use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "ORDR_LOG";
const DEFAULT_FILTER: &str = "ordr=info";
const VERBOSE_FILTER: &str = "ordr=debug";

pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordr")
}

/// `ORDR_LOG` wins when set; otherwise info, or debug with `--verbose`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Send all tracing output to `<dir>/ordr.log`. The terminal is owned by the
/// UI, so nothing is written to stdout or stderr.
pub fn init_tracing(dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("ordr.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .try_init()?;

    Ok(path)
}
