//! Event record flowing through the pipeline

use super::severity::Severity;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;

/// Failure attached to an error-severity event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Build a detail from any error, rendering its source chain as the stack.
    ///
    /// When backtraces are enabled (`RUST_BACKTRACE`), the captured backtrace
    /// is appended after the chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = format!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            stack.push('\n');
            stack.push_str(&backtrace.to_string());
        }

        Self {
            message: err.to_string(),
            stack: Some(stack),
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// HTTP request descriptor carried by `http` events.
///
/// Travels through the pipeline serialized as JSON in the event message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub ip: String,
    pub method: String,
    pub url: String,
    pub http_version: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn new(
        ip: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        http_version: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            method: method.into(),
            url: url.into(),
            http_version: http_version.into(),
            headers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn referrer(&self) -> Option<&str> {
        self.headers.get("referrer").map(String::as_str)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get("user-agent").map(String::as_str)
    }
}

/// Escape newlines, carriage returns and tabs so one event stays one line
pub(crate) fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub label: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl LogEvent {
    /// Messages are sanitized against log injection, except `http`
    /// payloads: those are JSON, where raw whitespace can only sit between
    /// tokens, and their decoded fields are sanitized when rendered.
    pub fn new(severity: Severity, label: impl Into<String>, message: impl AsRef<str>) -> Self {
        let message = message.as_ref();
        let message = if severity == Severity::Http {
            message.to_string()
        } else {
            sanitize(message)
        };

        Self {
            timestamp: Local::now(),
            severity,
            label: label.into(),
            message,
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: Option<ErrorDetail>) -> Self {
        self.error = error;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
