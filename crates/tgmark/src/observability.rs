//! Logging setup: human-readable events on stderr plus an optional JSONL file.
//!
//! Filter precedence is `RUST_LOG`, then `-q`/`-v`, then the configured
//! `log_level`. The file sink is chosen by `TGMARK_LOG_PATH` (exact file),
//! `TGMARK_LOG_DIR` or the configured `log_dir` (daily rolling files).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_PATH_ENV: &str = "TGMARK_LOG_PATH";
const LOG_DIR_ENV: &str = "TGMARK_LOG_DIR";
const LOG_FILE_PREFIX: &str = "tgmark";
const LOG_FILE_SUFFIX: &str = "jsonl";

/// Where JSONL log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// A single file, never rotated.
    File(PathBuf),
    /// Daily rolling files in a directory.
    Daily(PathBuf),
}

impl LogSink {
    fn appender(&self) -> anyhow::Result<RollingFileAppender> {
        let builder = RollingFileAppender::builder();
        let (builder, dir) = match self {
            Self::File(path) => {
                let name = path
                    .file_name()
                    .with_context(|| format!("log path has no file name: {}", path.display()))?;
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                (
                    builder
                        .rotation(Rotation::NEVER)
                        .filename_prefix(name.to_string_lossy()),
                    dir,
                )
            }
            Self::Daily(dir) => (
                builder
                    .rotation(Rotation::DAILY)
                    .filename_prefix(LOG_FILE_PREFIX)
                    .filename_suffix(LOG_FILE_SUFFIX),
                dir.as_path(),
            ),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        builder
            .build(dir)
            .with_context(|| format!("failed to open log file in {}", dir.display()))
    }
}

/// Resolved logging destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// JSONL file sink; `None` logs to stderr only.
    pub log_sink: Option<LogSink>,
}

impl ObservabilityConfig {
    /// Read `TGMARK_LOG_PATH` and `TGMARK_LOG_DIR`, falling back to the
    /// configured log directory.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV),
            std::env::var_os(LOG_DIR_ENV),
            log_dir,
        )
    }

    fn resolve(
        log_path: Option<OsString>,
        env_dir: Option<OsString>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let non_empty = |v: OsString| (!v.is_empty()).then(|| PathBuf::from(v));
        let log_sink = match log_path.and_then(non_empty) {
            Some(path) => Some(LogSink::File(path)),
            None => env_dir
                .and_then(non_empty)
                .or(config_dir)
                .map(LogSink::Daily),
        };
        Self { log_sink }
    }
}

/// Build the event filter from `RUST_LOG` or the CLI flags and configured level.
pub fn env_filter(quiet: bool, verbose: u8, level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(flag_level(quiet, verbose, level))
}

fn flag_level(quiet: bool, verbose: u8, level: &str) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file sink on drop; hold it for the life of
/// the process.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &config.log_sink {
        Some(sink) => {
            let (writer, guard) = tracing_appender::non_blocking(sink.appender()?);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;
    Ok(guard)
}
