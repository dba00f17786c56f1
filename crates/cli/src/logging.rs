//! Logging setup
//!
//! Two layers on one registry: a console layer (stderr, `pretty`/`compact`/
//! `json`) and a plain-text file layer written off-thread into a
//! size-rotated file.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use hostkit_core::application::constants::{LOG_BACKUP_COUNT, LOG_ROTATE_BYTES};

use crate::rotating::RotatingFile;

/// Name of the active log file inside the log directory
pub const LOG_FILE_NAME: &str = "hostkit.log";

/// Console output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// One line per event
    Compact,
    /// Production: JSON structured logging
    Json,
}

/// Logging configuration resolved from flags and environment
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub format: LogFormat,
    /// 0 = warn, 1 = info, 2+ = debug (console only)
    pub verbosity: u8,
}

impl LogConfig {
    fn console_directive(&self) -> &'static str {
        match self.verbosity {
            0 => "hostkit=warn",
            1 => "hostkit=info",
            _ => "hostkit=debug",
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the console filter. The file always records
/// `hostkit=debug`. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    let log_path = config.dir.join(LOG_FILE_NAME);
    let file = RotatingFile::open(&log_path, LOG_ROTATE_BYTES, LOG_BACKUP_COUNT)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.console_directive()))
        .context("Failed to create console env filter")?;
    let file_filter =
        EnvFilter::try_new("hostkit=debug").context("Failed to create file env filter")?;

    let console = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(log_file = %log_path.display(), "Logging initialized");

    Ok(guard)
}
