//! Timestamp formatting for stamped log fields

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp format applied by the timestamp stamping stage
///
/// # Examples
///
/// ```
/// use catalog_logger::core::TimestampFormat;
/// use chrono::{Local, TimeZone};
///
/// let at = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Display.format(&at), "2025-01-08 10:30:45");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `YYYY-MM-DD HH:mm:ss`, the format every sink uses by default
    #[default]
    Display,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+00:00`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Custom strftime format
    ///
    /// ```
    /// use catalog_logger::core::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    pub const DISPLAY_PATTERN: &'static str = "%Y-%m-%d %H:%M:%S";

    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            TimestampFormat::Display => datetime.format(Self::DISPLAY_PATTERN).to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                // An invalid pattern makes the formatter return fmt::Error
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    return datetime.format(Self::DISPLAY_PATTERN).to_string();
                }
                out
            }
        }
    }

    /// Reject custom patterns chrono cannot format
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "timestamp_format",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn fixed_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_display_format() {
        let result = TimestampFormat::Display.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08 10:30:45");
    }

    #[test]
    fn test_display_format_keeps_local_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = fixed_datetime().with_timezone(&offset);
        assert_eq!(TimestampFormat::Display.format(&at), "2025-01-08 12:30:45");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123+00:00");
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45"));
        assert!(result.contains("+00:00") || result.ends_with('Z'));
    }

    #[test]
    fn test_custom_apache_format() {
        let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S +0000".to_string());
        assert_eq!(format.format(&fixed_datetime()), "08/Jan/2025:10:30:45 +0000");
    }

    #[test]
    fn test_invalid_custom_pattern_falls_back_to_display() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08 10:30:45");
    }

    #[test]
    fn test_validate_custom_pattern() {
        assert!(TimestampFormat::Custom("%d/%b/%Y".to_string()).validate().is_ok());
        assert!(TimestampFormat::Display.validate().is_ok());
        assert!(matches!(
            TimestampFormat::Custom("%Q".to_string()).validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_default_is_display() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Display);
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
