//! Day file appender
//!
//! One append-only file per calendar day, `{dir}/{yyyyMMdd}.log`. The
//! drain worker opens it at the start of a cycle and closes it at the end,
//! so no handle is held between cycles and external tools are free to
//! move or delete the file.
//!
//! Entries are written unbuffered, one `write_all` each, so a full disk or
//! broken sink fails the append of the entry it hit.

use crate::core::{Appender, LoggerError, RenderedEntry, Result, TimestampFormat};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct DailyFileAppender {
    path: PathBuf,
    file: Option<File>,
    timestamp_format: TimestampFormat,
}

impl DailyFileAppender {
    /// `yyyyMMdd.log`
    pub fn file_name(date: NaiveDate) -> String {
        format!("{}.log", date.format("%Y%m%d"))
    }

    pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(Self::file_name(date))
    }

    /// Open (creating directory and file as needed) the file for `date`.
    ///
    /// With the `file-lock` feature the file is held under an advisory
    /// exclusive lock until the appender is closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created, the file cannot be
    /// opened, or the lock cannot be taken.
    pub fn open(dir: &Path, date: NaiveDate, timestamp_format: TimestampFormat) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", dir.display()),
                e,
            )
        })?;

        let path = Self::path_for(dir, date);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        #[cfg(feature = "file-lock")]
        fs2::FileExt::lock_exclusive(&file)
            .map_err(|_| LoggerError::file_lock(path.display().to_string()))?;

        Ok(Self {
            path,
            file: Some(file),
            timestamp_format,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, release the lock and close the file
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        let flushed = file.flush().map_err(|e| {
            LoggerError::io_operation(
                "flush day file",
                format!("Failed to flush '{}'", self.path.display()),
                e,
            )
        });

        #[cfg(feature = "file-lock")]
        let _ = fs2::FileExt::unlock(&file);

        flushed
    }
}

impl Appender for DailyFileAppender {
    fn append(&mut self, entry: &RenderedEntry<'_>) -> Result<()> {
        let path = &self.path;
        let file = self.file.as_mut().ok_or_else(|| {
            LoggerError::file_appender(path.display().to_string(), "already closed")
        })?;

        let timestamp_str = self.timestamp_format.format(&entry.timestamp);
        let output = format!("\n{}:\n{}\n", timestamp_str, entry.body);

        file.write_all(output.as_bytes()).map_err(|e| {
            LoggerError::io_operation(
                "write day file",
                format!("Failed to write '{}'", path.display()),
                e,
            )
        })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "daily_file"
    }
}

impl Drop for DailyFileAppender {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
