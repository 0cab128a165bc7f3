//! Console appender, used as the fallback sink
//!
//! Writes to stderr so that diagnostics never mix with the host
//! application's stdout.

use crate::core::{Appender, RenderedEntry, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

pub struct ConsoleAppender {
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::TimeMillis,
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: use_colors && cfg!(feature = "console"),
            ..Self::new()
        }
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_log_spooler::appenders::ConsoleAppender;
    /// use rust_log_spooler::TimestampFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render one entry as a single stderr line
    pub fn format_line(&self, entry: &RenderedEntry<'_>) -> String {
        let kind_str = format!("{:9}", entry.kind.to_str());
        #[cfg(feature = "console")]
        let kind_str = if self.use_colors {
            kind_str.color(entry.kind.color_code()).to_string()
        } else {
            kind_str
        };

        format!(
            "[{}] [{}] {}",
            self.timestamp_format.format(&entry.timestamp),
            kind_str,
            entry.body.replace('\n', "\n    ")
        )
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &RenderedEntry<'_>) -> Result<()> {
        let line = self.format_line(entry);
        writeln!(std::io::stderr().lock(), "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
