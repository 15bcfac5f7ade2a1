//! File appender implementation

use crate::core::{Appender, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only file destination.
///
/// Lines go through a [`LineWriter`], so each append reaches the file
/// before `append` returns and appends land in call order.
pub struct FileAppender {
    writer: LineWriter<File>,
    path: PathBuf,
    name: String,
}

impl FileAppender {
    /// Open `path` for appending, creating the file if needed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use catalog_logger::appenders::FileAppender;
    ///
    /// let appender = FileAppender::new("./logs/errors.log").unwrap();
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            writer: LineWriter::new(file),
            path,
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn append(&mut self, line: &str) -> Result<()> {
        let mut output = String::with_capacity(line.len() + 1);
        output.push_str(line);
        output.push('\n');
        self.writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_lines_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.log");

        let mut appender = FileAppender::new(&path).unwrap();
        appender.append("first").unwrap();
        appender.append("second").unwrap();

        // Visible without an explicit flush
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
        assert_eq!(appender.name(), "errors.log");
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("httpRequests.log");

        FileAppender::new(&path).unwrap().append("one").unwrap();
        FileAppender::new(&path).unwrap().append("two").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = FileAppender::new(dir.path().join("missing").join("errors.log"));
        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
    }
}
