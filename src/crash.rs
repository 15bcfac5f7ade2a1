//! Crash capture
//!
//! Uncaught failures are written to dedicated capture sinks as one JSON
//! object per line, bypassing the dispatch floor, thresholds and filters:
//!
//! - a panic outside any guarded scope is an **uncaught exception** and
//!   lands in `exceptions.log` through the process panic hook;
//! - an `Err` or a panic escaping a task started with
//!   [`CrashCapture::spawn_guarded`] (or `spawn_guarded_task` with the
//!   `async-tasks` feature) is an **unhandled rejection** and lands in
//!   `rejections.log`.
//!
//! The hook body only formats and appends. Exiting the process is left to
//! the bootstrap caller.

use crate::core::logger::panic_message;
use crate::core::{Appender, LogEvent, LoggerError, LoggerHandle, Result, TimestampFormat};
use parking_lot::Mutex;
use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Upper bound on waiting for a capture sink inside the panic hook
const CAPTURE_LOCK_TIMEOUT: Duration = Duration::from_millis(250);

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrashKind {
    Exception,
    Rejection,
}

impl CrashKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CrashKind::Exception => "uncaughtException",
            CrashKind::Rejection => "unhandledRejection",
        }
    }
}

/// Who is responsible for a panic raised on the current thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicScope {
    /// Nobody catches it: the panic hook records an uncaught exception
    Unguarded,
    /// A guarded task catches it and records a rejection
    GuardedTask,
    /// A sink write caught by the dispatcher's isolation
    Isolated,
}

thread_local! {
    static PANIC_SCOPE: Cell<PanicScope> = const { Cell::new(PanicScope::Unguarded) };
}

pub fn current_scope() -> PanicScope {
    PANIC_SCOPE.with(Cell::get)
}

/// Run `f` with the current thread marked as `scope`, restoring the
/// previous marker afterwards, including on unwind.
pub(crate) fn scoped<R>(scope: PanicScope, f: impl FnOnce() -> R) -> R {
    struct Restore(PanicScope);

    impl Drop for Restore {
        fn drop(&mut self) {
            PANIC_SCOPE.with(|s| s.set(self.0));
        }
    }

    let _restore = Restore(PANIC_SCOPE.with(|s| s.replace(scope)));
    f()
}

/// The two destinations reserved for crash events
pub struct CaptureSinks {
    exceptions: Mutex<Box<dyn Appender>>,
    rejections: Mutex<Box<dyn Appender>>,
}

impl CaptureSinks {
    pub fn new(exceptions: impl Appender + 'static, rejections: impl Appender + 'static) -> Self {
        Self {
            exceptions: Mutex::new(Box::new(exceptions)),
            rejections: Mutex::new(Box::new(rejections)),
        }
    }

    pub fn write(&self, kind: CrashKind, line: &str) -> Result<()> {
        let slot = match kind {
            CrashKind::Exception => &self.exceptions,
            CrashKind::Rejection => &self.rejections,
        };
        let mut appender = slot
            .try_lock_for(CAPTURE_LOCK_TIMEOUT)
            .ok_or_else(|| LoggerError::writer(format!("{} sink is busy", kind.prefix())))?;
        appender.append(line)?;
        appender.flush()
    }

    pub fn flush(&self) -> Result<()> {
        self.exceptions.lock().flush()?;
        self.rejections.lock().flush()
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    pub argv: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

impl ProcessInfo {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            cwd: std::env::current_dir()
                .ok()
                .map(|p| p.display().to_string()),
            argv: std::env::args().collect(),
            executable: std::env::current_exe()
                .ok()
                .map(|p| p.display().to_string()),
        }
    }
}

/// One line of `exceptions.log` / `rejections.log`
#[derive(Debug, Serialize)]
pub struct CrashReport<'a> {
    pub level: &'static str,
    pub label: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exception: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rejection: bool,
    pub timestamp: String,
    pub date: String,
    pub process: ProcessInfo,
}

impl<'a> CrashReport<'a> {
    pub fn from_event(kind: CrashKind, event: &'a LogEvent) -> Self {
        Self {
            level: "error",
            label: &event.label,
            message: format!("{}: {}", kind.prefix(), event.message),
            stack: event.error.as_ref().and_then(|e| e.stack.as_deref()),
            exception: kind == CrashKind::Exception,
            rejection: kind == CrashKind::Rejection,
            timestamp: TimestampFormat::Display.format(&event.timestamp),
            date: event.timestamp.to_rfc2822(),
            process: ProcessInfo::current(),
        }
    }
}

fn panic_stack(location: Option<String>) -> Option<String> {
    let mut stack = location.map(|l| format!("at {}", l)).unwrap_or_default();

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        if !stack.is_empty() {
            stack.push('\n');
        }
        stack.push_str(&backtrace.to_string());
    }

    if stack.is_empty() {
        None
    } else {
        Some(stack)
    }
}

/// Installs the process-wide panic hook and runs guarded tasks
#[derive(Clone)]
pub struct CrashCapture {
    logger: LoggerHandle,
}

impl CrashCapture {
    pub fn new(logger: LoggerHandle) -> Self {
        Self { logger }
    }

    /// Install the panic hook once per process.
    ///
    /// The previous hook still runs after the report is written. Returns
    /// `false` if a hook was already installed by an earlier call.
    pub fn install(&self) -> bool {
        if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
            return false;
        }

        let logger = Arc::clone(&self.logger);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if current_scope() == PanicScope::Unguarded {
                let description = panic_message(info.payload());
                let stack = panic_stack(info.location().map(|l| l.to_string()));
                logger.capture(CrashKind::Exception, &description, stack);
            }
            previous(info);
        }));
        true
    }

    pub fn is_installed() -> bool {
        HOOK_INSTALLED.load(Ordering::SeqCst)
    }

    pub fn capture_exception(&self, description: &str, stack: Option<String>) {
        self.logger.capture(CrashKind::Exception, description, stack);
    }

    pub fn capture_rejection(&self, description: &str, stack: Option<String>) {
        self.logger.capture(CrashKind::Rejection, description, stack);
    }

    /// Run a fallible task on a named thread.
    ///
    /// An `Err` result or a panic inside `f` is recorded as a rejection and
    /// the join handle yields `None`.
    pub fn spawn_guarded<F, T, E>(
        &self,
        name: &str,
        f: F,
    ) -> std::io::Result<thread::JoinHandle<Option<T>>>
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + std::fmt::Debug + Send + 'static,
    {
        let logger = Arc::clone(&self.logger);
        let task = name.to_string();

        thread::Builder::new().name(task.clone()).spawn(move || {
            let outcome = scoped(PanicScope::GuardedTask, || {
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
            });
            settle(&logger, &task, outcome)
        })
    }

    /// Spawn a fallible tokio task whose failure is recorded as a rejection.
    #[cfg(feature = "async-tasks")]
    pub fn spawn_guarded_task<F, T, E>(
        &self,
        name: &str,
        future: F,
    ) -> tokio::task::JoinHandle<Option<T>>
    where
        F: std::future::Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + std::fmt::Debug + Send + 'static,
    {
        let logger = Arc::clone(&self.logger);
        let task = name.to_string();
        let inner = tokio::spawn(guarded::GuardedFuture::new(future));

        tokio::spawn(async move {
            let outcome = match inner.await {
                Ok(result) => Ok(result),
                Err(join_err) if join_err.is_panic() => Err(join_err.into_panic()),
                // Cancelled by its owner, not a failure
                Err(_) => return None,
            };
            settle(&logger, &task, outcome)
        })
    }
}

fn settle<T, E>(
    logger: &LoggerHandle,
    task: &str,
    outcome: std::result::Result<std::result::Result<T, E>, Box<dyn std::any::Any + Send>>,
) -> Option<T>
where
    E: std::fmt::Display + std::fmt::Debug,
{
    match outcome {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            logger.capture(
                CrashKind::Rejection,
                &format!("task '{}' failed: {}", task, e),
                Some(format!("{:?}", e)),
            );
            None
        }
        Err(payload) => {
            logger.capture(
                CrashKind::Rejection,
                &format!("task '{}' panicked: {}", task, panic_message(payload.as_ref())),
                None,
            );
            None
        }
    }
}

#[cfg(feature = "async-tasks")]
mod guarded {
    use super::{scoped, PanicScope};
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Marks every poll of the inner future as a guarded scope
    pub(super) struct GuardedFuture<F> {
        inner: Pin<Box<F>>,
    }

    impl<F> GuardedFuture<F> {
        pub(super) fn new(inner: F) -> Self {
            Self {
                inner: Box::pin(inner),
            }
        }
    }

    impl<F: Future> Future for GuardedFuture<F> {
        type Output = F::Output;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            scoped(PanicScope::GuardedTask, || self.inner.as_mut().poll(cx))
        }
    }
}
