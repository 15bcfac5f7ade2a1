//! Stamping stages

use super::{FormatRecord, FormatStage};
use crate::core::TimestampFormat;
use colored::Colorize as _;

/// Stamps the fixed process label
#[derive(Debug, Clone)]
pub struct LabelStamp {
    label: String,
}

impl LabelStamp {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl FormatStage for LabelStamp {
    fn apply(&self, record: &mut FormatRecord<'_>) {
        record.label = Some(self.label.clone());
    }
}

/// Stamps the event instant rendered with the configured format
#[derive(Debug, Clone, Default)]
pub struct TimestampStamp {
    format: TimestampFormat,
}

impl TimestampStamp {
    pub fn new(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl FormatStage for TimestampStamp {
    fn apply(&self, record: &mut FormatRecord<'_>) {
        record.timestamp = Some(self.format.format(&record.event.timestamp));
    }
}

/// Colors the displayed severity name
#[derive(Debug, Clone, Copy, Default)]
pub struct Colorize;

impl FormatStage for Colorize {
    fn apply(&self, record: &mut FormatRecord<'_>) {
        let severity = record.event.severity;
        record.level = severity.to_str().color(severity.color_code()).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogEvent, Severity};

    #[test]
    fn test_label_stamp() {
        let event = LogEvent::new(Severity::Info, "ignored", "m");
        let mut record = FormatRecord::new(&event);
        LabelStamp::new("CatalogService").apply(&mut record);
        assert_eq!(record.label.as_deref(), Some("CatalogService"));
    }

    #[test]
    fn test_timestamp_stamp_custom() {
        let event = LogEvent::new(Severity::Info, "svc", "m");
        let mut record = FormatRecord::new(&event);
        TimestampStamp::new(TimestampFormat::Custom("%Y".to_string())).apply(&mut record);
        assert_eq!(record.timestamp.unwrap(), event.timestamp.format("%Y").to_string());
    }

    #[test]
    fn test_colorize_keeps_severity_name() {
        colored::control::set_override(true);
        let event = LogEvent::new(Severity::Warn, "svc", "m");
        let mut record = FormatRecord::new(&event);
        Colorize.apply(&mut record);
        assert!(record.level.contains("warn"));
        assert!(record.level.starts_with("\u{1b}["));
    }
}
