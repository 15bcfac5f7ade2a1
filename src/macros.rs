//! Logging macros with `format!`-style arguments.
//!
//! # Examples
//!
//! ```
//! use catalog_logger::prelude::*;
//! use catalog_logger::{info, warn};
//!
//! let logger = Logger::builder().build();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! warn!(logger, "Cache miss ratio {:.1}%", 42.5);
//! ```

/// Log a message at the given severity.
///
/// ```
/// # use catalog_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use catalog_logger::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Warn, "Retry {} of {}", 2, 5);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log($severity, format!($($arg)+), None)
    };
}

/// Log a debug-level message.
///
/// ```
/// # use catalog_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use catalog_logger::debug;
/// debug!(logger, "Cache key: {}", "product:42");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use catalog_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use catalog_logger::info;
/// info!(logger, "Connected to {} in {}ms", "postgres", 12);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use catalog_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use catalog_logger::warn;
/// warn!(logger, "Slow query: {}ms", 1500);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

/// Log an error-level message, optionally carrying an error value.
///
/// ```
/// # use catalog_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use catalog_logger::error;
/// let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
/// error!(logger, "Redis unavailable on port {}", 6379);
/// error!(logger, err = &err; "Error while initializing the {}", "cache");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, err = $err:expr; $($arg:tt)+) => {
        $logger.error_from(format!($($arg)+), $err)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Logger, Severity};

    #[test]
    fn test_macros_respect_floor() {
        let logger = Logger::builder().floor(Severity::Warn).build();

        debug!(logger, "Debug {}", 1);
        info!(logger, "Info {}", 2);
        warn!(logger, "Warn {}", 3);
        error!(logger, "Error {}", 4);
        log!(logger, Severity::Http, "{}", "{}");

        assert_eq!(logger.metrics().below_floor(), 3);
        assert_eq!(logger.metrics().events_dispatched(), 2);
    }

    #[test]
    fn test_error_macro_with_error_value() {
        let logger = Logger::builder().build();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        error!(logger, err = &err; "write failed after {} attempts", 3);
        assert_eq!(logger.metrics().events_dispatched(), 1);
    }
}
