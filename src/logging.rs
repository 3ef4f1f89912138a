//! Logger setup.
//!
//! bibcite logs through `slog_scope::logger()`, which discards everything
//! until a global logger is installed. [`init_logger`] installs one: a compact
//! terminal drain filtered to the configured level and, optionally, a pretty
//! JSON file drain that records everything down to `Trace`.

use crate::error::CiteError;
use serde::Deserialize;
use slog::{debug, o, Drain, Level};
use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

/// Logger configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Verbosity between 0 (critical only) and 5 (trace).
    pub verbosity: u8,
    /// Also write a JSON log to this file.
    pub json_file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(verbosity: u8, json_file: Option<PathBuf>) -> LogConfig {
        LogConfig {
            verbosity,
            json_file,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::new(1, None)
    }
}

/// Map a verbosity number onto a log level.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::Critical,
        1 => Level::Error,
        2 => Level::Warning,
        3 => Level::Info,
        4 => Level::Debug,
        5 => Level::Trace,
        _ => Level::Info,
    }
}

/// Install the global logger.
///
/// Logging stays active until the returned guard is dropped.
pub fn init_logger(config: &LogConfig) -> Result<slog_scope::GlobalLoggerGuard, CiteError> {
    let min_log_level = level_from_verbosity(config.verbosity);

    let term_decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(term_decorator).build().fuse();
    let term_drain = term_drain.filter_level(min_log_level).fuse();

    let guard = match &config.json_file {
        Some(path) => {
            // Setup the file AND terminal loggers
            let log_file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .map_err(|e| {
                    CiteError::Logging(format!(
                        "cannot open log file {}—{}",
                        path.to_string_lossy(),
                        e
                    ))
                })?;
            let file_drain = slog_json::Json::new(log_file)
                .set_pretty(true)
                .add_default_keys()
                .build()
                .fuse();
            let file_drain = file_drain.filter_level(Level::Trace).fuse();
            let dual_logger = slog::Logger::root(
                Mutex::new(slog::Duplicate(term_drain, file_drain)).fuse(),
                o!("version" => env!("CARGO_PKG_VERSION")),
            );
            slog_scope::set_global_logger(dual_logger)
        }
        None => {
            // Setup just the terminal logger
            let term_logger = slog::Logger::root(
                Mutex::new(term_drain).fuse(),
                o!("version" => env!("CARGO_PKG_VERSION")),
            );
            slog_scope::set_global_logger(term_logger)
        }
    };

    debug!(slog_scope::logger(), "Logger setup");
    Ok(guard)
}
