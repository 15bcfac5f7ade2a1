//! Appender trait for sink destinations

use super::error::Result;

/// Append-only line destination behind a sink
pub trait Appender: Send + Sync {
    /// Append one formatted line; the appender adds the line terminator.
    fn append(&mut self, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
