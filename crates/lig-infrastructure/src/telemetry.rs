//! Tracing subscriber setup.

use std::path::Path;

use lig_core::{LigError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter variable checked before `RUST_LOG`.
pub const ENV_LOG: &str = "LIG_LOG";
pub const LOG_FILE_PREFIX: &str = "lig-sync.log";

/// Filter from `LIG_LOG`, then `RUST_LOG`, then `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// in `log_dir` when given.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<()> {
    let file_layer = log_dir.map(|dir| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
    });

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| LigError::config(format!("tracing init failed: {e}")))
}
