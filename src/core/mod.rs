//! Core spooler types and traits

pub mod appender;
pub mod clock;
pub mod config;
pub mod drain;
pub mod error;
pub mod interval;
pub mod log_kind;
pub mod log_record;
pub mod maintenance;
pub mod metrics;
pub mod overflow_policy;
pub mod queue;
pub mod segment;
pub mod spooler;
pub mod suppression;
pub mod template;
pub mod timestamp;

pub use appender::{Appender, RenderedEntry};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{SpoolerConfig, DEFAULT_DRAIN_INTERVAL_MS, DEFAULT_INTERNAL_FAILURE_CAP};
pub use drain::CycleReport;
pub use error::{LoggerError, RecordedError, Result};
pub use interval::{CancellationToken, IntervalTask, TaskErrorHandler};
pub use log_kind::{LogKind, LogKindMask};
pub use log_record::LogRecord;
pub use maintenance::{DeleteOutcome, LogFileInfo, DEFAULT_DELETE_MIN_SIZE};
pub use metrics::SpoolerMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy, QueueCapacity};
pub use queue::{EnqueueOutcome, LogQueue};
pub use segment::{ElapsedSegmentLogger, SegmentState};
pub use spooler::{
    LogSpooler, LogSpoolerBuilder, SpoolerHandle, WriteObserver, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use suppression::{SuppressionCache, Verdict, DEFAULT_SUPPRESSION_WINDOW_SECS};
pub use template::format_template;
pub use timestamp::TimestampFormat;
