//! Standard catalog service wiring
//!
//! | Sink        | Destination                 | Min        | Filter     |
//! |-------------|-----------------------------|------------|------------|
//! | console     | stdout                      | mode-based | none       |
//! | http-access | `<log_dir>/httpRequests.log`| `http`     | http only  |
//! | error       | `<log_dir>/errors.log`      | `error`    | error only |
//!
//! plus the `exceptions.log` and `rejections.log` capture sinks.

use crate::appenders::{ConsoleAppender, FileAppender};
use crate::core::{
    filter::SeverityFilter, Appender, Logger, LoggerConfig, LoggerError, LoggerHandle, Result,
    Severity, Sink,
};
use crate::crash::CrashCapture;
use crate::format::FormatPipeline;
use parking_lot::Mutex;
use std::sync::Arc;

static INSTANCE: Mutex<Option<LoggerHandle>> = parking_lot::const_mutex(None);

/// Initialize the process logger and install crash capture.
///
/// Called once by the bootstrap sequence before the datastore, cache and
/// server start. A second call returns the same handle without building
/// new sinks or installing a second hook; its configuration is ignored.
pub fn init(config: LoggerConfig) -> Result<LoggerHandle> {
    let mut instance = INSTANCE.lock();
    if let Some(ref handle) = *instance {
        return Ok(Arc::clone(handle));
    }

    let handle = Arc::new(build_logger(&config)?);
    CrashCapture::new(Arc::clone(&handle)).install();
    *instance = Some(Arc::clone(&handle));
    Ok(handle)
}

/// Build the standard logger writing its console sink to stdout.
///
/// Unlike [`init`], this installs no hook and keeps no process-wide state.
pub fn build_logger(config: &LoggerConfig) -> Result<Logger> {
    standard_logger(config, ConsoleAppender::new())
}

/// Build the standard logger with a caller-supplied console destination.
pub fn standard_logger(config: &LoggerConfig, console: impl Appender + 'static) -> Result<Logger> {
    let config = config.clone().from_env();
    let console_level = config.console_level.unwrap_or(Severity::Debug);
    let floor = config.dispatch_floor.unwrap_or(Severity::Debug);

    if config.label.trim().is_empty() {
        return Err(LoggerError::config("LoggerConfig", "label must not be empty"));
    }
    config.timestamp_format.validate()?;

    std::fs::create_dir_all(&config.log_dir).map_err(|e| {
        LoggerError::io_operation(
            "creating log directory",
            format!("cannot create '{}'", config.log_dir.display()),
            e,
        )
    })?;

    let label = config.label.as_str();
    let timestamps = config.timestamp_format.clone();

    let console = Sink::new(
        "console",
        FormatPipeline::console(label, timestamps.clone(), config.console_colors),
        console,
    )
    .min_severity(console_level);

    let http_access = Sink::new(
        "http-access",
        FormatPipeline::http_access(label, timestamps.clone()),
        FileAppender::new(config.http_requests_path())?,
    )
    .min_severity(Severity::Http)
    .filter(SeverityFilter::only(Severity::Http));

    let errors = Sink::new(
        "error",
        FormatPipeline::error(label, timestamps),
        FileAppender::new(config.errors_path())?,
    )
    .min_severity(Severity::Error)
    .filter(SeverityFilter::only(Severity::Error));

    let builder = Logger::builder()
        .label(label)
        .floor(floor)
        .sink(http_access)
        .sink(errors)
        .sink(console)
        .capture_sinks(
            FileAppender::new(config.exceptions_path())?,
            FileAppender::new(config.rejections_path())?,
        );

    let builder = if config.async_dispatch {
        builder.async_mode()
    } else {
        builder
    };

    Ok(builder.build())
}
