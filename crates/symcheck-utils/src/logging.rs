//! # Logging Utilities
//!
//! Logging infrastructure for symcheck using `tracing`.
//!
//! The checker's own report lines go straight to the diagnostics stream;
//! logging here is for tracing what the resolver and rule engine are
//! doing, and stays quiet unless asked for.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: log level filter (e.g. `debug`, `symcheck_core=trace`)
//! - `SYMCHECK_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)
//! - `SYMCHECK_LOG_FILE`: optional path to a log file (console only if unset)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging with default settings.
///
/// Reads `RUST_LOG`, `SYMCHECK_LOG_FORMAT` and `SYMCHECK_LOG_FILE` from
/// the environment; defaults to INFO level, pretty format, console only.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging
/// fails.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("SYMCHECK_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    init_logging_internal(format, default_level)
}

/// Initialize logging with explicit level and format.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging
/// fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_logging_internal(format, level.into())
}

/// Internal initialization function
fn init_logging_internal(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    // RUST_LOG can override the default level with more specific filters
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let log_file = env::var("SYMCHECK_LOG_FILE").ok().map(PathBuf::from);

    match format {
        LogFormat::Pretty => {
            // Diagnostics go to stderr; logs keep to stdout so the two
            // streams stay separable.
            let console_layer = fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_writer(io::stdout)
                .with_filter(env_filter.clone());

            if let Some(file_path) = log_file {
                let file_layer = file_layer_pretty(&file_path)?.with_filter(env_filter);
                Registry::default().with(console_layer).with(file_layer).init();
            } else {
                Registry::default().with(console_layer).init();
            }
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_writer(io::stdout)
                .with_filter(env_filter.clone());

            if let Some(file_path) = log_file {
                let file_layer = file_layer_json(&file_path)?.with_filter(env_filter);
                Registry::default().with(console_layer).with(file_layer).init();
            } else {
                Registry::default().with(console_layer).init();
            }
        }
    }

    Ok(())
}

/// Create the non-blocking writer for a log file, creating its parent
/// directory first so a bad `SYMCHECK_LOG_FILE` path fails here rather
/// than being swallowed by the background writer.
fn non_blocking_appender(file_path: &Path) -> Result<tracing_appender::non_blocking::NonBlocking, LoggingError>
{
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file_appender = tracing_appender::rolling::never(
        file_path.parent().unwrap_or(Path::new(".")),
        file_path.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Keep the flush guard alive for the life of the process
    std::mem::forget(guard);
    Ok(non_blocking)
}

fn file_layer_pretty<S>(file_path: &Path) -> Result<impl Layer<S>, LoggingError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    Ok(fmt::layer()
        .with_writer(non_blocking_appender(file_path)?)
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)) // No ANSI in files
}

fn file_layer_json<S>(file_path: &Path) -> Result<impl Layer<S>, LoggingError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    Ok(fmt::layer()
        .json()
        .with_writer(non_blocking_appender(file_path)?)
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_current_span(true))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// File logging error (log file path unusable)
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_unusable_log_file_path_is_a_file_error()
    {
        // Parent of the log path is a regular file, so the directory
        // cannot be created.
        let dir = env::temp_dir().join(format!("symcheck-logging-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let err = non_blocking_appender(&blocker.join("log.txt")).unwrap_err();
        assert!(matches!(err, LoggingError::FileError(_)));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }
}
