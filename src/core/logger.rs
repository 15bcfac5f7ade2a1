//! Logger core: stamps events and fans them out to sinks

use super::{
    appender::Appender,
    error::Result,
    event::{ErrorDetail, HttpRequest, LogEvent},
    metrics::LoggerMetrics,
    severity::Severity,
    sink::Sink,
};
use crate::crash::{self, CaptureSinks, CrashKind, CrashReport, PanicScope};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default timeout for draining the async worker on flush and drop
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared, read-only capability handed to every collaborator at startup
pub type LoggerHandle = Arc<Logger>;

enum Command {
    Event(LogEvent),
    Flush(Sender<()>),
}

pub struct Logger {
    label: String,
    floor: Severity,
    sinks: Arc<RwLock<Vec<Sink>>>,
    capture: Option<CaptureSinks>,
    sender: Mutex<Option<Sender<Command>>>,
    async_handle: Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use catalog_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .label("CatalogService")
    ///     .floor(Severity::Info)
    ///     .build();
    /// logger.debug("dropped below the floor");
    /// assert_eq!(logger.metrics().below_floor(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn spawn_worker(
        sinks: Arc<RwLock<Vec<Sink>>>,
        metrics: Arc<LoggerMetrics>,
    ) -> Option<(Sender<Command>, thread::JoinHandle<()>)> {
        let (sender, receiver) = unbounded::<Command>();

        let spawned = thread::Builder::new()
            .name("catalog-logger".to_string())
            .spawn(move || {
                // Single consumer keeps per-sink order equal to emit order
                while let Ok(command) = receiver.recv() {
                    match command {
                        Command::Event(event) => Self::dispatch(&sinks, &event, &metrics),
                        Command::Flush(ack) => {
                            Self::flush_sinks(&mut sinks.write());
                            let _ = ack.send(());
                        }
                    }
                }
                Self::flush_sinks(&mut sinks.write());
            });

        match spawned {
            Ok(handle) => Some((sender, handle)),
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Failed to spawn async worker, logging synchronously: {}",
                    e
                );
                None
            }
        }
    }

    /// Fan one event out to every sink whose threshold and filter accept it.
    ///
    /// **Per-Sink Isolation**: each write runs under `catch_unwind`, so one
    /// failing destination never blocks the others.
    fn dispatch(sinks: &RwLock<Vec<Sink>>, event: &LogEvent, metrics: &LoggerMetrics) {
        let mut sinks_guard = sinks.write();
        let mut violations = Vec::new();

        for sink in sinks_guard.iter_mut() {
            if !sink.accepts(event) {
                continue;
            }

            match Self::render(sink, event, metrics) {
                Some(Ok(line)) => Self::deliver(sink, &line, metrics),
                Some(Err(e)) => {
                    metrics.record_format_violation();
                    violations.push(Self::violation_report(sink, event, &e));
                }
                None => {}
            }
        }

        // Violation reports go through normal acceptance and are never re-reported
        for report in &violations {
            for sink in sinks_guard.iter_mut() {
                if !sink.accepts(report) {
                    continue;
                }
                match Self::render(sink, report, metrics) {
                    Some(Ok(line)) => Self::deliver(sink, &line, metrics),
                    Some(Err(e)) => eprintln!(
                        "[LOGGER ERROR] Sink '{}' could not format violation report: {}",
                        sink.name(),
                        e
                    ),
                    None => {}
                }
            }
        }
    }

    /// Run the sink's pipeline; a panicking stage counts as a sink failure.
    fn render(sink: &Sink, event: &LogEvent, metrics: &LoggerMetrics) -> Option<Result<String>> {
        let result = crash::scoped(PanicScope::Isolated, || {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.format(event)))
        });

        match result {
            Ok(formatted) => Some(formatted),
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' pipeline panicked: {}",
                    sink.name(),
                    panic_message(panic_info.as_ref())
                );
                metrics.record_sink_failure();
                None
            }
        }
    }

    fn deliver(sink: &mut Sink, line: &str, metrics: &LoggerMetrics) {
        let result = crash::scoped(PanicScope::Isolated, || {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.write(line)))
        });

        match result {
            Ok(Ok(())) => {
                metrics.record_written();
            }
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                metrics.record_sink_failure();
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                     Other sinks continue to function.",
                    sink.name(),
                    panic_message(panic_info.as_ref())
                );
                metrics.record_sink_failure();
            }
        }
    }

    fn violation_report(sink: &Sink, event: &LogEvent, err: &super::error::LoggerError) -> LogEvent {
        let stack = format!("Error: {}\n    payload: {}", err, super::event::sanitize(&event.message));
        LogEvent::new(
            Severity::Error,
            event.label.clone(),
            format!(
                "Format contract violation in sink '{}' ({}) for {} event: {}",
                sink.name(),
                sink.renderer_name(),
                event.severity,
                err
            ),
        )
        .with_timestamp(event.timestamp)
        .with_error(Some(ErrorDetail::new(err.to_string()).with_stack(stack)))
    }

    fn flush_sinks(sinks: &mut [Sink]) {
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", sink.name(), e);
            }
        }
    }

    /// Typed emission entry point.
    ///
    /// Never fails: events below the dispatch floor are counted and
    /// dropped, sink failures are isolated and counted.
    pub fn log(&self, severity: Severity, message: impl AsRef<str>, error: Option<ErrorDetail>) {
        if !severity.passes(self.floor) {
            self.metrics.record_below_floor();
            return;
        }

        let event = LogEvent::new(severity, self.label.as_str(), message).with_error(error);
        self.metrics.record_dispatched();
        self.send_event(event);
    }

    /// Emission by severity name.
    ///
    /// An unknown name is a caller bug and is the only error this returns.
    pub fn emit(
        &self,
        severity: &str,
        message: impl AsRef<str>,
        error: Option<ErrorDetail>,
    ) -> Result<()> {
        let severity: Severity = severity.parse()?;
        self.log(severity, message, error);
        Ok(())
    }

    fn send_event(&self, event: LogEvent) {
        let rejected = match self.sender.lock().as_ref() {
            Some(sender) => match sender.send(Command::Event(event)) {
                Ok(()) => None,
                Err(crossbeam_channel::SendError(Command::Event(event))) => Some(event),
                Err(_) => None,
            },
            None => Some(event),
        };

        // Synchronous mode, or the worker is gone
        if let Some(event) = rejected {
            Self::dispatch(&self.sinks, &event, &self.metrics);
        }
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Severity::Debug, message, None);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message, None);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Severity::Warn, message, None);
    }

    /// Log a request descriptor for the access log
    pub fn http(&self, request: &HttpRequest) {
        match serde_json::to_string(request) {
            Ok(payload) => self.log(Severity::Http, payload, None),
            Err(e) => {
                self.metrics.record_format_violation();
                self.log(
                    Severity::Error,
                    format!("Failed to serialize http request: {}", e),
                    Some(ErrorDetail::from_error(&e)),
                );
            }
        }
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>, error: impl Into<Option<ErrorDetail>>) {
        self.log(Severity::Error, message, error.into());
    }

    /// Log an error event carrying `err` and its source chain
    pub fn error_from(&self, message: impl AsRef<str>, err: &(dyn std::error::Error + 'static)) {
        self.log(Severity::Error, message, Some(ErrorDetail::from_error(err)));
    }

    /// Write a crash event straight to its capture sink.
    ///
    /// Bypasses the floor, thresholds and filters. Lock acquisition is
    /// bounded so a panic raised while a capture sink is held cannot
    /// deadlock the panic hook.
    pub fn capture(&self, kind: CrashKind, description: &str, stack: Option<String>) {
        let mut detail = ErrorDetail::new(description);
        detail.stack = stack;
        let event = LogEvent::new(Severity::Error, self.label.as_str(), description)
            .with_error(Some(detail));

        let Some(ref capture) = self.capture else {
            eprintln!("[LOGGER CRITICAL] {} (no capture sink): {}", kind.prefix(), event.message);
            return;
        };

        let line = match serde_json::to_string(&CrashReport::from_event(kind, &event)) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("[LOGGER CRITICAL] Failed to encode crash report: {}", e);
                return;
            }
        };

        match capture.write(kind, &line) {
            Ok(()) => {
                self.metrics.record_crash();
                self.metrics.record_written();
            }
            Err(e) => {
                eprintln!("[LOGGER CRITICAL] Failed to write {} report: {}", kind.prefix(), e);
                self.metrics.record_sink_failure();
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn floor(&self) -> Severity {
        self.floor
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.read().iter().map(|s| s.name().to_string()).collect()
    }

    pub fn is_async(&self) -> bool {
        self.sender.lock().is_some()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Wait for queued events to be written, then flush every sink.
    pub fn flush(&self) -> Result<()> {
        let ack = {
            let sender = self.sender.lock();
            match sender.as_ref() {
                Some(sender) => {
                    let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
                    sender
                        .send(Command::Flush(ack_tx))
                        .ok()
                        .map(|_| ack_rx)
                }
                None => None,
            }
        };

        if let Some(ack) = ack {
            if ack.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT).is_err() {
                eprintln!("[LOGGER WARNING] Async worker did not drain within timeout.");
            }
        }

        let mut sinks = self.sinks.write();
        for sink in sinks.iter_mut() {
            sink.flush()?;
        }
        if let Some(ref capture) = self.capture {
            capture.flush()?;
        }
        Ok(())
    }

    /// Stop the async worker after it drains, waiting at most `timeout`.
    ///
    /// Returns `true` if every queued event was written. Events emitted
    /// afterwards are dispatched synchronously.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.lock().take());

        if let Some(handle) = self.async_handle.lock().take() {
            let start = std::time::Instant::now();

            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!("[LOGGER ERROR] Async worker thread panicked during shutdown: {:?}", e);
                        return false;
                    }
                    break;
                }

                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Async worker thread did not finish within timeout. \
                         Some logs may be lost."
                    );
                    return false;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }

        true
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let failures = self.metrics.sink_failures();
        if failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed writes (failure rate: {:.2}%)",
                failures,
                self.metrics.failure_rate()
            );
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing a Logger with a fixed set of sinks
///
/// # Example
/// ```
/// use catalog_logger::prelude::*;
/// use catalog_logger::format::FormatPipeline;
///
/// let logger = Logger::builder()
///     .label("CatalogService")
///     .sink(
///         Sink::new(
///             "console",
///             FormatPipeline::console("CatalogService", TimestampFormat::Display, false),
///             ConsoleAppender::new(),
///         )
///         .min_severity(Severity::Warn),
///     )
///     .async_mode()
///     .build();
/// ```
pub struct LoggerBuilder {
    label: String,
    floor: Severity,
    sinks: Vec<Sink>,
    capture: Option<CaptureSinks>,
    async_mode: bool,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            label: super::config::DEFAULT_LABEL.to_string(),
            floor: Severity::Debug,
            sinks: Vec::new(),
            capture: None,
            async_mode: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the dispatcher floor checked before any sink
    #[must_use = "builder methods return a new value"]
    pub fn floor(mut self, floor: Severity) -> Self {
        self.floor = floor;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Destinations for crash events
    #[must_use = "builder methods return a new value"]
    pub fn capture_sinks(
        mut self,
        exceptions: impl Appender + 'static,
        rejections: impl Appender + 'static,
    ) -> Self {
        self.capture = Some(CaptureSinks::new(exceptions, rejections));
        self
    }

    /// Hand sink writes to a background worker
    ///
    /// If not called, the logger writes on the caller's thread.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self) -> Self {
        self.async_mode = true;
        self
    }

    pub fn build(self) -> Logger {
        let sinks = Arc::new(RwLock::new(self.sinks));
        let metrics = Arc::new(LoggerMetrics::new());

        let (sender, handle) = if self.async_mode {
            match Logger::spawn_worker(Arc::clone(&sinks), Arc::clone(&metrics)) {
                Some((sender, handle)) => (Some(sender), Some(handle)),
                None => (None, None),
            }
        } else {
            (None, None)
        };

        Logger {
            label: self.label,
            floor: self.floor,
            sinks,
            capture: self.capture,
            sender: Mutex::new(sender),
            async_handle: Mutex::new(handle),
            metrics,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
