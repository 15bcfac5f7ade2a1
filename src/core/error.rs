//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A severity name outside the five known levels
    #[error("Unknown severity: '{0}'")]
    UnknownSeverity(String),

    /// A message that does not satisfy the payload contract of its format
    #[error("Parse error ({format_type}): {message}")]
    ParseError {
        format_type: String,
        message: String,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn unknown_severity(name: impl Into<String>) -> Self {
        LoggerError::UnknownSeverity(name.into())
    }

    /// Create a parse error for a format stage
    pub fn parse(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ParseError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::unknown_severity("verbose");
        assert!(matches!(err, LoggerError::UnknownSeverity(_)));

        let err = LoggerError::config("ConsoleSink", "Invalid threshold");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::unknown_severity("verbose");
        assert_eq!(err.to_string(), "Unknown severity: 'verbose'");

        let err = LoggerError::parse("http-access", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "Parse error (http-access): expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("creating log directory", "cannot create ./logs", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("creating log directory"));
        assert!(err.to_string().contains("cannot create ./logs"));
    }
}
