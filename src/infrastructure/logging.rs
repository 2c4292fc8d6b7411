use std::{io, path::Path};

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "relay.log";

/// Keeps the file writer flushing for the life of the process.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// `RUST_LOG` wins, then the configured level, then `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(logging: &LoggingConfig, logs_dir: &Path) -> Result<()> {
    FILE_GUARD.get_or_try_init(|| {
        let (file_writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

        tracing_subscriber::registry()
            .with(build_filter(&logging.level))
            .with(fmt::layer().with_writer(io::stdout).with_target(true))
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_ansi(false),
            )
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

        tracing::info!(
            target: "config",
            logs = %logs_dir.display(),
            level = %logging.level,
            "tracing initialized"
        );
        Ok::<_, anyhow::Error>(guard)
    })?;
    Ok(())
}
