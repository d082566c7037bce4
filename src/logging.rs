//! File logging.
//!
//! The terminal belongs to the game, so tracing output goes to a file only.
//! `DUEL_LOG` sets the filter (default `info`), `DUEL_LOG_DIR` the directory
//! (default: `sword-duel` under the system temp dir).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "duel.log";

pub fn log_directory() -> PathBuf {
    std::env::var_os("DUEL_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("sword-duel"))
}

/// Install the global subscriber. Keep the guard alive for the whole run or
/// buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
    let dir = log_directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("DUEL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}
