//! Severity definitions

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered log severity.
///
/// Ordering follows priority: `Error` is the most important and compares
/// greatest, so an event passes a threshold `m` when `event >= m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug = 0,
    Http = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Http,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Http => "http",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Debug => Yellow,
            Severity::Http => Green,
            Severity::Info => Blue,
            Severity::Warn => Yellow,
            Severity::Error => Red,
        }
    }

    /// Whether an event of this severity clears the `threshold`
    #[inline]
    pub fn passes(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "http" => Ok(Severity::Http),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            _ => Err(LoggerError::unknown_severity(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
        assert!(Severity::Info > Severity::Http);
        assert!(Severity::Http > Severity::Debug);
    }

    #[test]
    fn test_passes_threshold() {
        assert!(Severity::Error.passes(Severity::Http));
        assert!(Severity::Http.passes(Severity::Http));
        assert!(!Severity::Debug.passes(Severity::Http));
        assert!(!Severity::Warn.passes(Severity::Error));
    }

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!("HTTP".parse::<Severity>().unwrap(), Severity::Http);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert!(matches!(
            "verbose".parse::<Severity>(),
            Err(LoggerError::UnknownSeverity(name)) if name == "verbose"
        ));
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Http).unwrap();
        assert_eq!(json, "\"http\"");
        let back: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(back, Severity::Error);
    }
}
