//! Per-sink format pipelines
//!
//! A pipeline is an ordered list of [`FormatStage`]s that stamp display
//! fields onto a [`FormatRecord`], followed by one [`Render`] that turns the
//! stamped record into the final line. Renderers only read stamped fields,
//! so stamping always runs before rendering.

pub mod render;
pub mod stamps;

pub use render::{ConsoleRender, ErrorRender, HttpAccessRender};
pub use stamps::{Colorize, LabelStamp, TimestampStamp};

use crate::core::{LogEvent, Result, TimestampFormat};

/// Display fields stamped onto one event on its way to one sink
#[derive(Debug, Clone)]
pub struct FormatRecord<'a> {
    pub event: &'a LogEvent,
    pub label: Option<String>,
    pub timestamp: Option<String>,
    /// Severity name as displayed; colorized on the console
    pub level: String,
}

impl<'a> FormatRecord<'a> {
    pub fn new(event: &'a LogEvent) -> Self {
        Self {
            event,
            label: None,
            timestamp: None,
            level: event.severity.to_str().to_string(),
        }
    }

    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    pub fn timestamp_or_empty(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

/// One stamping transform
pub trait FormatStage: Send + Sync {
    fn apply(&self, record: &mut FormatRecord<'_>);
}

/// Final severity-specific rendering
pub trait Render: Send + Sync {
    fn render(&self, record: &FormatRecord<'_>) -> Result<String>;

    /// Short name used in parse errors and violation reports
    fn name(&self) -> &str;
}

pub struct FormatPipeline {
    stages: Vec<Box<dyn FormatStage>>,
    renderer: Box<dyn Render>,
}

impl FormatPipeline {
    pub fn new(renderer: impl Render + 'static) -> Self {
        Self {
            stages: Vec::new(),
            renderer: Box::new(renderer),
        }
    }

    #[must_use]
    pub fn stage(mut self, stage: impl FormatStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Console line: `<ts> [<label>] <severity> : <message>`
    pub fn console(label: &str, timestamp_format: TimestampFormat, colors: bool) -> Self {
        let pipeline = Self::new(ConsoleRender);
        let pipeline = if colors {
            pipeline.stage(Colorize)
        } else {
            pipeline
        };
        pipeline
            .stage(LabelStamp::new(label))
            .stage(TimestampStamp::new(timestamp_format))
    }

    /// Access line for `http` events
    pub fn http_access(label: &str, timestamp_format: TimestampFormat) -> Self {
        Self::new(HttpAccessRender)
            .stage(LabelStamp::new(label))
            .stage(TimestampStamp::new(timestamp_format))
    }

    /// Error line: `[<ts>] [<label>]: <message>  <stack>`
    pub fn error(label: &str, timestamp_format: TimestampFormat) -> Self {
        Self::new(ErrorRender)
            .stage(LabelStamp::new(label))
            .stage(TimestampStamp::new(timestamp_format))
    }

    pub fn format(&self, event: &LogEvent) -> Result<String> {
        let mut record = FormatRecord::new(event);
        for stage in &self.stages {
            stage.apply(&mut record);
        }
        self.renderer.render(&record)
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}
