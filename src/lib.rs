//! # Rust Log Spooler
//!
//! Background log ingestion: producers on any thread enqueue records
//! without touching the disk, and a single worker drains them into one
//! append-only file per day.
//!
//! ## Features
//!
//! - **Non-blocking producers**: enqueueing is a short mutex-guarded push
//! - **Day files**: `{log_dir}/{yyyyMMdd}.log`, opened only for the length of a drain cycle
//! - **Repeated-error suppression**: identical errors are written once per window with a count
//! - **Segment timing**: [`ElapsedSegmentLogger`] logs slow operations step by step
//! - **Maintenance**: list and prune old log files
//!
//! ## Example
//!
//! ```
//! use rust_log_spooler::prelude::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut spooler = LogSpooler::builder().log_dir(dir.path()).build().unwrap();
//!
//! spooler.write_normal("job {0} started", &[&"nightly-export"]);
//! let io = std::io::Error::new(std::io::ErrorKind::NotFound, "export.csv");
//! spooler.write_error_with(&io, "job failed");
//!
//! assert!(spooler.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, DailyFileAppender};
    pub use crate::core::{
        Appender, Clock, CycleReport, ElapsedSegmentLogger, LogKind, LogKindMask, LogRecord,
        LogSpooler, LogSpoolerBuilder, LoggerError, ManualClock, OverflowPolicy, QueueCapacity,
        RecordedError, RenderedEntry, Result, SpoolerConfig, SpoolerHandle, SpoolerMetrics,
        TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

pub use appenders::{ConsoleAppender, DailyFileAppender};
pub use core::{
    format_template, Appender, CancellationToken, Clock, CycleReport, ElapsedSegmentLogger,
    IntervalTask, LogFileInfo, LogKind, LogKindMask, LogRecord, LogSpooler, LogSpoolerBuilder,
    LoggerError, ManualClock, OverflowCallback, OverflowPolicy, QueueCapacity, RecordedError,
    RenderedEntry, Result, SegmentState, SpoolerConfig, SpoolerHandle, SpoolerMetrics,
    SystemClock, TimestampFormat, WriteObserver, DEFAULT_SHUTDOWN_TIMEOUT,
};
