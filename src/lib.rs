//! # Catalog Logger
//!
//! Structured logging pipeline for the catalog service: five ordered
//! severities, per-sink filters and format pipelines, console and file
//! fan-out, and capture of uncaught panics and failed background tasks.
//!
//! ## Features
//!
//! - **Explicit handle**: [`init`] builds the logger once and returns a
//!   shared [`LoggerHandle`] for every collaborator
//! - **Per-sink pipelines**: console, HTTP access and error formats
//! - **Isolation**: a failing sink never affects the others or the caller
//! - **Crash capture**: panics and guarded task failures land in their own files
//!
//! ```no_run
//! use catalog_logger::{init, HttpRequest, LoggerConfig};
//!
//! let logger = init(LoggerConfig::default()).unwrap();
//! logger.info("Datastore connected");
//! logger.http(&HttpRequest::new("1.2.3.4", "GET", "/x", "1.1").with_header("user-agent", "curl"));
//! ```

pub mod appenders;
pub mod bootstrap;
pub mod core;
pub mod crash;
pub mod format;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::bootstrap::{build_logger, init};
    pub use crate::core::{
        Appender, ErrorDetail, Filter, HttpRequest, LogEvent, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerHandle, LoggerMetrics, Result, Severity,
        SeverityFilter, Sink, TimestampFormat,
    };
    pub use crate::crash::{CrashCapture, CrashKind};
}

pub use crate::appenders::{ConsoleAppender, FileAppender};
pub use crate::bootstrap::{build_logger, init, standard_logger};
pub use crate::core::{
    Appender, ErrorDetail, Filter, HttpRequest, LogEvent, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerHandle, LoggerMetrics, Result, Severity, SeverityFilter, Sink,
    TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::crash::{CrashCapture, CrashKind};
