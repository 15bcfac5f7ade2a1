//! Sink: a destination bound to a threshold, a filter and a format pipeline

use super::{
    appender::Appender,
    error::Result,
    event::LogEvent,
    filter::{AcceptAll, Filter},
    severity::Severity,
};
use crate::format::FormatPipeline;

/// Immutable sink configuration plus its destination
pub struct Sink {
    name: String,
    min_severity: Severity,
    filter: Box<dyn Filter>,
    pipeline: FormatPipeline,
    appender: Box<dyn Appender>,
}

impl Sink {
    pub fn new(
        name: impl Into<String>,
        pipeline: FormatPipeline,
        appender: impl Appender + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            min_severity: Severity::Debug,
            filter: Box::new(AcceptAll),
            pipeline,
            appender: Box::new(appender),
        }
    }

    #[must_use]
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> Severity {
        self.min_severity
    }

    /// Threshold first, then filter
    pub fn accepts(&self, event: &LogEvent) -> bool {
        event.severity.passes(self.min_severity) && self.filter.accepts(event)
    }

    pub fn format(&self, event: &LogEvent) -> Result<String> {
        self.pipeline.format(event)
    }

    pub fn renderer_name(&self) -> &str {
        self.pipeline.renderer_name()
    }

    pub fn write(&mut self, line: &str) -> Result<()> {
        self.appender.append(line)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.appender.flush()
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("min_severity", &self.min_severity)
            .field("renderer", &self.pipeline.renderer_name())
            .field("appender", &self.appender.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::SeverityFilter;
    use crate::format::FormatPipeline;
    use crate::core::TimestampFormat;

    struct NullAppender;

    impl Appender for NullAppender {
        fn append(&mut self, _line: &str) -> Result<()> {
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "null"
        }
    }

    #[test]
    fn test_threshold_then_filter() {
        let sink = Sink::new(
            "http-access",
            FormatPipeline::http_access("svc", TimestampFormat::Display),
            NullAppender,
        )
        .min_severity(Severity::Http)
        .filter(SeverityFilter::only(Severity::Http));

        assert!(sink.accepts(&LogEvent::new(Severity::Http, "svc", "{}")));
        assert!(!sink.accepts(&LogEvent::new(Severity::Debug, "svc", "m")));
        assert!(!sink.accepts(&LogEvent::new(Severity::Error, "svc", "m")));
    }

    #[test]
    fn test_default_sink_accepts_everything() {
        let sink = Sink::new(
            "console",
            FormatPipeline::console("svc", TimestampFormat::Display, false),
            NullAppender,
        );
        assert!(Severity::ALL
            .iter()
            .all(|s| sink.accepts(&LogEvent::new(*s, "svc", "m"))));
        assert_eq!(sink.threshold(), Severity::Debug);
    }
}
