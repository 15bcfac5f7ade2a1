//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod logger;
pub mod metrics;
pub mod severity;
pub mod sink;
pub mod timestamp;

pub use appender::Appender;
pub use config::{resolve_console_level, resolve_dispatch_floor, LoggerConfig};
pub use error::{LoggerError, Result};
pub use event::{ErrorDetail, HttpRequest, LogEvent};
pub use filter::{AcceptAll, Filter, SeverityFilter};
pub use logger::{Logger, LoggerBuilder, LoggerHandle, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use severity::Severity;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
