//! Log directory maintenance
//!
//! Files are aged by modification time against the caller's `now`, so the
//! spooler's clock decides what counts as old.

use super::error::{LoggerError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Files at or below this size are kept by [`delete_logs_older_than`] callers
/// that do not pass their own floor
pub const DEFAULT_DELETE_MIN_SIZE: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl LogFileInfo {
    /// Whole days between the last modification and `now`
    pub fn age_days(&self, now: DateTime<Local>) -> i64 {
        (now - self.modified).num_days()
    }
}

/// Result of a delete pass
#[derive(Debug, Default)]
pub struct DeleteOutcome {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, LoggerError)>,
}

/// Every `*.log` file under `dir` (recursively) at least `days` days old.
///
/// A missing directory yields an empty list.
pub fn list_log_files(dir: &Path, days: u32, now: DateTime<Local>) -> Result<Vec<LogFileInfo>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    collect_log_files(dir, &mut files)?;

    files.retain(|file| file.age_days(now) >= i64::from(days));
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Delete log files at least `days` days old whose size exceeds `min_size`.
///
/// A file that cannot be removed is recorded in
/// [`DeleteOutcome::failed`] and the pass continues.
pub fn delete_logs_older_than(
    dir: &Path,
    days: u32,
    min_size: u64,
    now: DateTime<Local>,
) -> Result<DeleteOutcome> {
    let mut outcome = DeleteOutcome::default();
    for file in list_log_files(dir, days, now)? {
        if file.size <= min_size {
            continue;
        }
        match fs::remove_file(&file.path) {
            Ok(()) => outcome.deleted.push(file.path),
            Err(e) => {
                let error = LoggerError::io_operation(
                    "delete log file",
                    format!("Failed to delete '{}'", file.path.display()),
                    e,
                );
                outcome.failed.push((file.path, error));
            }
        }
    }
    Ok(outcome)
}

fn collect_log_files(dir: &Path, files: &mut Vec<LogFileInfo>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| read_dir_error(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| read_dir_error(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            collect_log_files(&path, files)?;
        } else if metadata.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            files.push(LogFileInfo {
                size: metadata.len(),
                modified: DateTime::<Local>::from(metadata.modified()?),
                path,
            });
        }
    }
    Ok(())
}

fn read_dir_error(dir: &Path, e: io::Error) -> LoggerError {
    LoggerError::io_operation(
        "list log directory",
        format!("Failed to read '{}'", dir.display()),
        e,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn write_log(path: &Path, size: usize, age: Duration) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; size]).unwrap();
        let modified = SystemTime::now() - age.to_std().unwrap();
        File::options().write(true).open(path).unwrap().set_modified(modified).unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let files = list_log_files(&dir.path().join("nope"), 0, Local::now()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_filters_by_age_and_extension_recursively() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        write_log(&dir.path().join("20250101.log"), 10, Duration::days(10));
        write_log(&dir.path().join("archive").join("20241201.log"), 10, Duration::days(40));
        write_log(&dir.path().join("today.log"), 10, Duration::hours(1));
        write_log(&dir.path().join("notes.txt"), 10, Duration::days(40));

        let files = list_log_files(dir.path(), 7, Local::now()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["20250101.log", "20241201.log"]);

        assert_eq!(list_log_files(dir.path(), 0, Local::now()).unwrap().len(), 3);
    }

    #[test]
    fn test_delete_respects_size_floor() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let big = dir.path().join("big.log");
        let small = dir.path().join("small.log");
        let fresh = dir.path().join("fresh.log");
        write_log(&big, 2048, Duration::days(8));
        write_log(&small, 1024, Duration::days(8));
        write_log(&fresh, 4096, Duration::days(2));

        let outcome =
            delete_logs_older_than(dir.path(), 7, DEFAULT_DELETE_MIN_SIZE, Local::now()).unwrap();
        assert_eq!(outcome.deleted, vec![big.clone()]);
        assert!(outcome.failed.is_empty());
        assert!(!big.exists());
        assert!(small.exists());
        assert!(fresh.exists());
    }
}
