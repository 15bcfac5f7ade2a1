//! Logger configuration and level resolution
//!
//! Two independent thresholds come from the environment:
//!
//! - the **console level**, chosen by the deployment mode variable
//!   (`APP_MODE`): `development`, unset or unrecognized shows everything
//!   (`debug`), a known non-development mode shows only `warn` and `error`;
//! - the **dispatch floor**, chosen by the stage variable (`APP_STAGE`):
//!   `PROD` gates the whole pipeline at `info`, anything else at `debug`.

use super::severity::Severity;
use super::timestamp::TimestampFormat;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_LABEL: &str = "CatalogService";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_MODE_VAR: &str = "APP_MODE";
pub const DEFAULT_STAGE_VAR: &str = "APP_STAGE";

pub const HTTP_REQUESTS_FILE: &str = "httpRequests.log";
pub const ERRORS_FILE: &str = "errors.log";
pub const EXCEPTIONS_FILE: &str = "exceptions.log";
pub const REJECTIONS_FILE: &str = "rejections.log";

/// Modes that count as a deployed environment and quiet the console.
const NON_DEVELOPMENT_MODES: &[&str] = &["production", "prod", "staging", "test"];

/// Resolve the console threshold from the deployment mode.
pub fn resolve_console_level(mode: Option<&str>) -> Severity {
    match mode.map(str::trim) {
        Some(mode) if NON_DEVELOPMENT_MODES.iter().any(|m| m.eq_ignore_ascii_case(mode)) => {
            Severity::Warn
        }
        _ => Severity::Debug,
    }
}

/// Resolve the dispatcher floor from the stage flag.
///
/// Only the exact value `PROD` raises the floor.
pub fn resolve_dispatch_floor(stage: Option<&str>) -> Severity {
    match stage {
        Some("PROD") => Severity::Info,
        _ => Severity::Debug,
    }
}

/// Configuration consumed by [`crate::init`].
///
/// Every field has a default, so an empty document deserializes to the
/// standard catalog service layout:
///
/// ```
/// use catalog_logger::LoggerConfig;
///
/// let config: LoggerConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.label, "CatalogService");
/// assert_eq!(config.log_dir.to_str(), Some("./logs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Process identity stamped on every event
    pub label: String,
    /// Directory holding the four log files; created at init
    pub log_dir: PathBuf,
    /// Environment variable holding the deployment mode
    pub mode_var: String,
    /// Environment variable holding the dispatch floor flag
    pub stage_var: String,
    /// Explicit console threshold; resolved from `mode_var` when absent
    pub console_level: Option<Severity>,
    /// Explicit dispatch floor; resolved from `stage_var` when absent
    pub dispatch_floor: Option<Severity>,
    pub console_colors: bool,
    /// Hand sink writes to a background worker instead of the caller
    pub async_dispatch: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            mode_var: DEFAULT_MODE_VAR.to_string(),
            stage_var: DEFAULT_STAGE_VAR.to_string(),
            console_level: None,
            dispatch_floor: None,
            console_colors: true,
            async_dispatch: false,
            timestamp_format: TimestampFormat::Display,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill both thresholds from the environment, keeping explicit values.
    #[must_use]
    pub fn from_env(self) -> Self {
        let mode = std::env::var(&self.mode_var).ok();
        let stage = std::env::var(&self.stage_var).ok();
        self.resolve_with(mode.as_deref(), stage.as_deref())
    }

    /// Fill both thresholds from the given flag values, keeping explicit values.
    #[must_use]
    pub fn resolve_with(mut self, mode: Option<&str>, stage: Option<&str>) -> Self {
        self.console_level = Some(
            self.console_level
                .unwrap_or_else(|| resolve_console_level(mode)),
        );
        self.dispatch_floor = Some(
            self.dispatch_floor
                .unwrap_or_else(|| resolve_dispatch_floor(stage)),
        );
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_console_level(mut self, level: Severity) -> Self {
        self.console_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_dispatch_floor(mut self, level: Severity) -> Self {
        self.dispatch_floor = Some(level);
        self
    }

    #[must_use]
    pub fn with_console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    #[must_use]
    pub fn with_async_dispatch(mut self, enabled: bool) -> Self {
        self.async_dispatch = enabled;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn http_requests_path(&self) -> PathBuf {
        self.log_dir.join(HTTP_REQUESTS_FILE)
    }

    pub fn errors_path(&self) -> PathBuf {
        self.log_dir.join(ERRORS_FILE)
    }

    pub fn exceptions_path(&self) -> PathBuf {
        self.log_dir.join(EXCEPTIONS_FILE)
    }

    pub fn rejections_path(&self) -> PathBuf {
        self.log_dir.join(REJECTIONS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_development_or_absent_is_debug() {
        assert_eq!(resolve_console_level(None), Severity::Debug);
        assert_eq!(resolve_console_level(Some("development")), Severity::Debug);
    }

    #[test]
    fn test_console_level_unrecognized_is_debug() {
        assert_eq!(resolve_console_level(Some("qa-cluster-7")), Severity::Debug);
        assert_eq!(resolve_console_level(Some("")), Severity::Debug);
    }

    #[test]
    fn test_console_level_deployed_is_warn() {
        assert_eq!(resolve_console_level(Some("production")), Severity::Warn);
        assert_eq!(resolve_console_level(Some("PROD")), Severity::Warn);
        assert_eq!(resolve_console_level(Some(" staging ")), Severity::Warn);
    }

    #[test]
    fn test_dispatch_floor() {
        assert_eq!(resolve_dispatch_floor(Some("PROD")), Severity::Info);
        assert_eq!(resolve_dispatch_floor(Some("prod")), Severity::Debug);
        assert_eq!(resolve_dispatch_floor(Some(" PROD")), Severity::Debug);
        assert_eq!(resolve_dispatch_floor(Some("development")), Severity::Debug);
        assert_eq!(resolve_dispatch_floor(None), Severity::Debug);
    }

    #[test]
    fn test_resolve_keeps_explicit_levels() {
        let config = LoggerConfig::new()
            .with_console_level(Severity::Error)
            .resolve_with(Some("development"), Some("PROD"));
        assert_eq!(config.console_level, Some(Severity::Error));
        assert_eq!(config.dispatch_floor, Some(Severity::Info));
    }

    #[test]
    fn test_from_env_reads_configured_variables() {
        let mut config = LoggerConfig::new();
        config.mode_var = "CATALOG_LOGGER_TEST_MODE_UNSET_9f2c".to_string();
        config.stage_var = "CATALOG_LOGGER_TEST_STAGE_UNSET_9f2c".to_string();
        let config = config.from_env();
        assert_eq!(config.console_level, Some(Severity::Debug));
        assert_eq!(config.dispatch_floor, Some(Severity::Debug));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"label":"Inventory","console_level":"warn"}"#).unwrap();
        assert_eq!(config.label, "Inventory");
        assert_eq!(config.console_level, Some(Severity::Warn));
        assert_eq!(config.errors_path(), PathBuf::from("./logs/errors.log"));
    }
}
