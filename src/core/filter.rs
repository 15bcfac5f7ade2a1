//! Per-sink filter predicates

use super::{event::LogEvent, severity::Severity};

/// Boolean gate evaluated after a sink's own threshold
pub trait Filter: Send + Sync {
    fn accepts(&self, event: &LogEvent) -> bool;
}

/// Accepts everything that cleared the sink threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Filter for AcceptAll {
    fn accepts(&self, _event: &LogEvent) -> bool {
        true
    }
}

/// Accepts exactly one severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityFilter {
    severity: Severity,
}

impl SeverityFilter {
    pub fn only(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Filter for SeverityFilter {
    fn accepts(&self, event: &LogEvent) -> bool {
        event.severity == self.severity
    }
}
