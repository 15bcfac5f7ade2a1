//! Dispatcher counters
//!
//! Emission never reports failure to the caller, so these counters are the
//! only place where missing lines show up.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for dispatcher health
///
/// # Example
///
/// ```
/// use catalog_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.lines_written(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events that cleared the dispatch floor
    events_dispatched: AtomicU64,

    /// Events dropped by the dispatch floor before any sink was consulted
    below_floor: AtomicU64,

    /// Lines successfully appended, across all sinks
    lines_written: AtomicU64,

    /// Appends that returned an error or panicked
    sink_failures: AtomicU64,

    /// Events a sink's format pipeline rejected
    format_violations: AtomicU64,

    /// Crash events written to a capture sink
    crashes_captured: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            below_floor: AtomicU64::new(0),
            lines_written: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            format_violations: AtomicU64::new(0),
            crashes_captured: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn below_floor(&self) -> u64 {
        self.below_floor.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_violations(&self) -> u64 {
        self.format_violations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn crashes_captured(&self) -> u64 {
        self.crashes_captured.load(Ordering::Relaxed)
    }

    /// Record an event entering fan-out; returns the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_below_floor(&self) -> u64 {
        self.below_floor.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.lines_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_violation(&self) -> u64 {
        self.format_violations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_crash(&self) -> u64 {
        self.crashes_captured.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of append attempts that failed, as a percentage (0.0 - 100.0)
    pub fn failure_rate(&self) -> f64 {
        let failed = self.sink_failures() as f64;
        let total = self.lines_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            below_floor: AtomicU64::new(self.below_floor()),
            lines_written: AtomicU64::new(self.lines_written()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            format_violations: AtomicU64::new(self.format_violations()),
            crashes_captured: AtomicU64::new(self.crashes_captured()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.events_dispatched(), 0);
        assert_eq!(metrics.lines_written(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.crashes_captured(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_sink_failure(), 0);
        assert_eq!(metrics.record_sink_failure(), 1);
        assert_eq!(metrics.sink_failures(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_sink_failure();
        }
        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_written();
        let snapshot = metrics.clone();
        metrics.record_written();
        assert_eq!(snapshot.lines_written(), 1);
        assert_eq!(metrics.lines_written(), 2);
    }
}
