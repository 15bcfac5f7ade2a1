//! Severity-specific renderers

use super::{FormatRecord, Render};
use crate::core::event::sanitize;
use crate::core::{HttpRequest, LoggerError, Result, Severity};
use std::borrow::Cow;

/// Human-readable console line
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRender;

impl Render for ConsoleRender {
    fn render(&self, record: &FormatRecord<'_>) -> Result<String> {
        let event = record.event;
        // Only http payloads reach the pipeline unsanitized
        let message = if event.severity == Severity::Http {
            Cow::Owned(sanitize(&event.message))
        } else {
            Cow::Borrowed(event.message.as_str())
        };
        let mut line = format!(
            "{} [{}] {} : {}",
            record.timestamp_or_empty(),
            record.label_or_empty(),
            record.level,
            message
        );
        if event.severity == Severity::Error {
            if let Some(ref error) = event.error {
                line.push(' ');
                line.push_str(&error.message);
            }
        }
        Ok(line)
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Access-log line built from the JSON request descriptor in the message
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpAccessRender;

impl Render for HttpAccessRender {
    fn render(&self, record: &FormatRecord<'_>) -> Result<String> {
        let request: HttpRequest = serde_json::from_str(&record.event.message)
            .map_err(|e| LoggerError::parse(self.name(), e.to_string()))?;

        Ok(format!(
            "[{}]:  {}  {}  HTTP/{}  {}  {}  {}",
            record.timestamp_or_empty(),
            sanitize(&request.method),
            sanitize(&request.url),
            sanitize(&request.http_version),
            sanitize(request.referrer().unwrap_or("-")),
            sanitize(request.user_agent().unwrap_or("-")),
            sanitize(&request.ip)
        ))
    }

    fn name(&self) -> &str {
        "http-access"
    }
}

/// Error-file line with the attached stack
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorRender;

impl Render for ErrorRender {
    fn render(&self, record: &FormatRecord<'_>) -> Result<String> {
        let stack = record
            .event
            .error
            .as_ref()
            .and_then(|e| e.stack.as_deref())
            .unwrap_or("");

        Ok(format!(
            "[{}] [{}]: {}  {}",
            record.timestamp_or_empty(),
            record.label_or_empty(),
            record.event.message,
            stack
        ))
    }

    fn name(&self) -> &str {
        "error"
    }
}
