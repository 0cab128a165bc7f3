//! Log spooler service
//!
//! Producers on any thread enqueue records through a [`SpoolerHandle`];
//! a single background [`IntervalTask`] drains the queue into the day
//! file every tick. Enqueueing never waits on the worker.

use super::{
    appender::{Appender, RenderedEntry},
    clock::{Clock, SharedClock, SystemClock},
    config::SpoolerConfig,
    drain::{CycleReport, DrainWorker},
    error::{LoggerError, RecordedError, Result},
    interval::{IntervalTask, TaskErrorHandler},
    log_kind::{LogKind, LogKindMask},
    log_record::LogRecord,
    maintenance::{self, LogFileInfo},
    metrics::SpoolerMetrics,
    overflow_policy::{OverflowCallback, QueueCapacity},
    queue::LogQueue,
    segment::ElapsedSegmentLogger,
    template::format_template,
    timestamp::TimestampFormat,
};
use crate::appenders::ConsoleAppender;
use chrono::{DateTime, Local};
use parking_lot::{Mutex, RwLock};
use std::fmt::{self, Display};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default shutdown timeout (5 seconds), used when the spooler is dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Observer invoked once per record written to the day file
pub type WriteObserver = Arc<dyn Fn(LogKind, &str) + Send + Sync>;

/// State shared by producers and the drain worker
pub(crate) struct SpoolerCore {
    pub(crate) queue: LogQueue,
    pub(crate) config: RwLock<SpoolerConfig>,
    pub(crate) observer: RwLock<Option<WriteObserver>>,
    pub(crate) metrics: Arc<SpoolerMetrics>,
    pub(crate) clock: SharedClock,
    /// Held for a whole drain cycle; there is only ever one consumer
    pub(crate) consumer: Mutex<DrainWorker>,
    pub(crate) fallback: Mutex<Box<dyn Appender>>,
    consecutive_failures: AtomicU32,
}

impl SpoolerCore {
    pub(crate) fn enqueue(&self, record: LogRecord) {
        self.queue.enqueue(record);
    }

    pub(crate) fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub(crate) fn failure_cap(&self) -> u32 {
        self.config.read().internal_failure_cap
    }

    /// True once the failure cap has been reached without a successful write
    pub(crate) fn in_fallback(&self) -> bool {
        self.consecutive_failures.load(Ordering::SeqCst) >= self.failure_cap()
    }

    pub(crate) fn reset_failures(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    /// Report a failure of the spooler itself.
    ///
    /// Below the failure cap the error is queued as an `Exception` record
    /// like any other; past it, the report goes to the fallback sink so a
    /// permanently broken day file cannot feed itself.
    pub(crate) fn report_internal(&self, error: &LoggerError) {
        self.metrics.record_internal_failure();
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        let recorded = RecordedError::capture(error);
        let record = LogRecord::from_error(self.now(), recorded, "");

        if failures > self.failure_cap() {
            let body = record.composed_body();
            self.write_fallback(&RenderedEntry {
                timestamp: record.timestamp,
                kind: record.kind,
                body: &body,
                repeat_count: 0,
            });
        } else {
            self.enqueue(record);
        }
    }

    pub(crate) fn write_fallback(&self, entry: &RenderedEntry<'_>) {
        let mut fallback = self.fallback.lock();
        match fallback.append(entry).and_then(|_| fallback.flush()) {
            Ok(()) => {
                self.metrics.record_fallback_write();
            }
            Err(e) => {
                eprintln!("[SPOOLER ERROR] Fallback sink '{}' failed: {}", fallback.name(), e);
            }
        }
    }

    pub(crate) fn notify(&self, kind: LogKind, body: &str) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| observer(kind, body)));
            if let Err(panic_info) = result {
                self.report_internal(&LoggerError::worker_panic("write observer", &*panic_info));
            }
        }
    }

    pub(crate) fn run_cycle(&self) -> Result<CycleReport> {
        self.consumer.lock().run_cycle(self)
    }

    fn record_min_ms(&self) -> u64 {
        self.config.read().record_min_ms
    }
}

/// Cheap, clonable producer side of a [`LogSpooler`]
///
/// Handles can be sent to other threads; all of them feed the same queue.
#[derive(Clone)]
pub struct SpoolerHandle {
    core: Arc<SpoolerCore>,
}

impl SpoolerHandle {
    /// Enqueue an already formatted message
    pub fn log(&self, kind: LogKind, message: impl Into<String>) {
        self.core.enqueue(LogRecord::new(kind, self.core.now(), message));
    }

    /// Enqueue a record as-is
    pub fn write_record(&self, record: LogRecord) {
        self.core.enqueue(record);
    }

    /// Expand `template` with `args` and enqueue it.
    ///
    /// If expansion fails the formatting error is enqueued as an
    /// `Exception` record and the raw template is logged instead.
    pub fn write_log(&self, kind: LogKind, template: &str, args: &[&dyn Display]) {
        self.write_log_at(self.core.now(), kind, template, args);
    }

    pub fn write_log_at(
        &self,
        timestamp: DateTime<Local>,
        kind: LogKind,
        template: &str,
        args: &[&dyn Display],
    ) {
        let body = match format_template(template, args) {
            Ok(body) => body,
            Err(e) => {
                self.write_error(&e);
                template.to_string()
            }
        };
        self.core.enqueue(LogRecord::new(kind, timestamp, body));
    }

    #[inline]
    pub fn write_normal(&self, template: &str, args: &[&dyn Display]) {
        self.write_log(LogKind::Normal, template, args);
    }

    #[inline]
    pub fn write_warn(&self, template: &str, args: &[&dyn Display]) {
        self.write_log(LogKind::Warn, template, args);
    }

    #[inline]
    pub fn write_exception(&self, template: &str, args: &[&dyn Display]) {
        self.write_log(LogKind::Exception, template, args);
    }

    /// Enqueue an error record; subject to repeated-error suppression
    pub fn write_error(&self, error: &(dyn std::error::Error + 'static)) {
        self.write_error_at(self.core.now(), error, "");
    }

    pub fn write_error_with(
        &self,
        error: &(dyn std::error::Error + 'static),
        message: impl Into<String>,
    ) {
        self.write_error_at(self.core.now(), error, message);
    }

    pub fn write_error_at(
        &self,
        timestamp: DateTime<Local>,
        error: &(dyn std::error::Error + 'static),
        message: impl Into<String>,
    ) {
        self.core
            .enqueue(LogRecord::from_error(timestamp, RecordedError::capture(error), message));
    }

    pub fn set_skip_mask(&self, mask: impl Into<LogKindMask>) {
        self.core.config.write().skip_mask = mask.into();
    }

    pub fn skip_mask(&self) -> LogKindMask {
        self.core.config.read().skip_mask
    }

    pub fn set_record_min_ms(&self, min_ms: u64) {
        self.core.config.write().record_min_ms = min_ms;
    }

    pub fn record_min_ms(&self) -> u64 {
        self.core.record_min_ms()
    }

    /// Directory the day files are written to
    pub fn log_path(&self) -> PathBuf {
        self.core.config.read().log_dir.clone()
    }

    pub fn set_on_write(&self, observer: WriteObserver) {
        *self.core.observer.write() = Some(observer);
    }

    pub fn clear_on_write(&self) {
        *self.core.observer.write() = None;
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> SpoolerConfig {
        self.core.config.read().clone()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.core.now()
    }

    /// Records waiting for the next drain cycle
    pub fn pending(&self) -> usize {
        self.core.queue.len()
    }

    pub fn metrics(&self) -> &SpoolerMetrics {
        &self.core.metrics
    }

    /// Start an elapsed-segment logger feeding this spooler
    pub fn segment(&self, title: &str) -> ElapsedSegmentLogger {
        let mut logger = ElapsedSegmentLogger::new(self.clone());
        logger.begin(title);
        logger
    }

    /// `*.log` files under the log directory at least `days` days old
    pub fn list_log_files(&self, days: u32) -> Result<Vec<LogFileInfo>> {
        maintenance::list_log_files(&self.log_path(), days, self.core.now())
    }

    /// Delete log files at least `days` days old and larger than `min_size` bytes.
    ///
    /// Files that cannot be removed are reported as `Exception` records and
    /// skipped. Returns the number of files deleted.
    pub fn delete_logs_older_than(&self, days: u32, min_size: u64) -> Result<usize> {
        let outcome =
            maintenance::delete_logs_older_than(&self.log_path(), days, min_size, self.core.now())?;
        for (path, error) in &outcome.failed {
            self.write_error_with(error, format!("Failed to delete '{}'", path.display()));
        }
        Ok(outcome.deleted.len())
    }

    /// [`delete_logs_older_than`](Self::delete_logs_older_than) with a 1 KiB size floor
    pub fn delete_logs(&self, days: u32) -> Result<usize> {
        self.delete_logs_older_than(days, maintenance::DEFAULT_DELETE_MIN_SIZE)
    }
}

impl fmt::Debug for SpoolerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpoolerHandle")
            .field("log_dir", &self.log_path())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Owner of the queue and the drain worker
///
/// Dereferences to [`SpoolerHandle`] for the producer API.
///
/// # Example
///
/// ```no_run
/// use rust_log_spooler::prelude::*;
///
/// let spooler = LogSpooler::builder()
///     .log_dir("/var/log/my-app")
///     .skip_mask(LogKind::None)
///     .build()
///     .unwrap();
///
/// spooler.write_normal("service started on port {0}", &[&8080]);
/// spooler.write_warn("cache miss ratio {0}", &[&0.4]);
/// ```
pub struct LogSpooler {
    handle: SpoolerHandle,
    worker: Option<IntervalTask>,
}

impl LogSpooler {
    /// Create a spooler with a background worker from `config`
    pub fn new(config: SpoolerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a spooler with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> LogSpoolerBuilder {
        LogSpoolerBuilder::new()
    }

    /// A clonable producer handle
    pub fn handle(&self) -> SpoolerHandle {
        self.handle.clone()
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Run one drain cycle on the calling thread.
    ///
    /// Safe to call while the background worker runs; cycles never overlap.
    /// A failed cycle is reported through the spooler and also returned.
    pub fn drain_cycle(&self) -> Result<CycleReport> {
        let result = self.handle.core.run_cycle();
        if let Err(ref e) = result {
            self.handle.core.report_internal(e);
        }
        result
    }

    /// Stop the worker and drain what is left.
    ///
    /// Returns `false` if the worker did not stop within `timeout` or the
    /// final drain failed.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let mut clean = true;
        if let Some(worker) = self.worker.take() {
            clean = worker.stop(timeout);
        }
        if !clean {
            // Worker may still hold the consumer lock
            return false;
        }

        if let Err(e) = self.drain_cycle() {
            eprintln!("[SPOOLER ERROR] Final drain failed: {}", e);
            return false;
        }
        true
    }
}

impl Deref for LogSpooler {
    type Target = SpoolerHandle;

    fn deref(&self) -> &SpoolerHandle {
        &self.handle
    }
}

impl Drop for LogSpooler {
    fn drop(&mut self) {
        if self.worker.is_some() || !self.handle.core.queue.is_empty() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }

        let dropped = self.handle.core.metrics.dropped();
        if dropped > 0 {
            eprintln!(
                "[SPOOLER WARNING] Spooler shutting down with {} dropped records",
                dropped
            );
        }
    }
}

/// Builder for constructing a [`LogSpooler`] with a fluent API
///
/// # Example
/// ```
/// use rust_log_spooler::prelude::*;
/// use std::sync::Arc;
///
/// let dir = tempfile::tempdir().unwrap();
/// let spooler = LogSpooler::builder()
///     .log_dir(dir.path())
///     .skip_mask(LogKind::None | LogKind::Normal)
///     .record_min_ms(50)
///     .on_write(Arc::new(|kind: LogKind, body: &str| println!("{}: {}", kind, body)))
///     .manual_drain()
///     .build()
///     .unwrap();
///
/// spooler.write_warn("low disk space on {0}", &[&"/var"]);
/// let report = spooler.drain_cycle().unwrap();
/// assert_eq!(report.written, 1);
/// ```
pub struct LogSpoolerBuilder {
    config: SpoolerConfig,
    clock: SharedClock,
    on_write: Option<WriteObserver>,
    on_overflow: Option<OverflowCallback>,
    appenders: Vec<Box<dyn Appender>>,
    fallback: Option<Box<dyn Appender>>,
    background: bool,
}

impl LogSpoolerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: SpoolerConfig::default(),
            clock: Arc::new(SystemClock),
            on_write: None,
            on_overflow: None,
            appenders: Vec::new(),
            fallback: None,
            background: true,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: SpoolerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn skip_mask(mut self, mask: impl Into<LogKindMask>) -> Self {
        self.config.skip_mask = mask.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn record_min_ms(mut self, min_ms: u64) -> Self {
        self.config.record_min_ms = min_ms;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn drain_interval(mut self, interval: Duration) -> Self {
        self.config.drain_interval_ms = interval.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn suppression_window(mut self, window: chrono::Duration) -> Self {
        self.config.suppression_window_secs = window.num_seconds();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn internal_failure_cap(mut self, cap: u32) -> Self {
        self.config.internal_failure_cap = cap;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: QueueCapacity) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Observer called with `(kind, body)` for every record written
    #[must_use = "builder methods return a new value"]
    pub fn on_write(mut self, observer: WriteObserver) -> Self {
        self.on_write = Some(observer);
        self
    }

    /// Callback for records dropped by a bounded queue
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Additional destination receiving every written entry
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Sink used once the internal failure cap is reached (stderr by default)
    #[must_use = "builder methods return a new value"]
    pub fn fallback<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.fallback = Some(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Do not start a background worker; drive cycles with
    /// [`LogSpooler::drain_cycle`]
    #[must_use = "builder methods return a new value"]
    pub fn manual_drain(mut self) -> Self {
        self.background = false;
        self
    }

    /// Build the spooler and, unless `manual_drain` was set, start its worker
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the worker thread
    /// cannot be spawned.
    pub fn build(self) -> Result<LogSpooler> {
        self.config.validate()?;

        let metrics = Arc::new(SpoolerMetrics::new());
        let mut queue = LogQueue::new(self.config.queue_capacity, Arc::clone(&metrics));
        if let Some(callback) = self.on_overflow {
            queue = queue.with_overflow_callback(callback);
        }

        let interval = self.config.drain_interval();
        let consumer = DrainWorker::new(self.config.suppression_window(), self.appenders);
        let core = Arc::new(SpoolerCore {
            queue,
            config: RwLock::new(self.config),
            observer: RwLock::new(self.on_write),
            metrics,
            clock: self.clock,
            consumer: Mutex::new(consumer),
            fallback: Mutex::new(
                self.fallback
                    .unwrap_or_else(|| Box::new(ConsoleAppender::new())),
            ),
            consecutive_failures: AtomicU32::new(0),
        });

        let worker = if self.background {
            let cycle_core = Arc::clone(&core);
            let error_core = Arc::clone(&core);
            let on_error: TaskErrorHandler =
                Arc::new(move |e: LoggerError| error_core.report_internal(&e));
            Some(IntervalTask::start(
                "log-spooler-drain",
                interval,
                move || cycle_core.run_cycle().map(|_| ()),
                on_error,
            )?)
        } else {
            None
        };

        Ok(LogSpooler {
            handle: SpoolerHandle { core },
            worker,
        })
    }
}

impl Default for LogSpoolerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use tempfile::TempDir;

    fn manual(dir: &TempDir) -> LogSpooler {
        LogSpooler::builder()
            .log_dir(dir.path())
            .manual_drain()
            .build()
            .expect("valid spooler")
    }

    #[test]
    fn test_builder_defaults() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let spooler = manual(&dir);
        assert!(!spooler.has_worker());
        assert_eq!(spooler.skip_mask(), LogKindMask::from(LogKind::None));
        assert_eq!(spooler.record_min_ms(), 1);
        assert_eq!(spooler.log_path(), dir.path());
        assert_eq!(spooler.pending(), 0);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = LogSpooler::builder()
            .drain_interval(Duration::ZERO)
            .manual_drain()
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_oversized_suppression_window_is_rejected_by_build() {
        let config = SpoolerConfig {
            suppression_window_secs: i64::MAX,
            ..SpoolerConfig::default()
        };
        let result = LogSpooler::builder().config(config).manual_drain().build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_format_failure_degrades_to_raw_template() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let spooler = manual(&dir);

        spooler.write_warn("needs {0} and {1}", &[&"one"]);

        let records = spooler.handle.core.queue.drain_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, LogKind::Exception);
        assert!(records[0].error.as_ref().unwrap().message.contains("out of range"));
        assert_eq!(records[1].kind, LogKind::Warn);
        assert_eq!(records[1].body, "needs {0} and {1}");
    }

    #[test]
    fn test_runtime_configuration() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let spooler = manual(&dir);

        spooler.set_skip_mask(LogKind::Warn | LogKind::Normal);
        assert!(spooler.skip_mask().intersects(LogKind::Warn));
        spooler.set_record_min_ms(40);
        assert_eq!(spooler.config().record_min_ms, 40);
    }

    #[test]
    fn test_records_use_injected_clock() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = ManualClock::default();
        let spooler = LogSpooler::builder()
            .log_dir(dir.path())
            .clock(clock.clone())
            .manual_drain()
            .build()
            .unwrap();

        spooler.log(LogKind::Normal, "stamped");
        let records = spooler.handle.core.queue.drain_all();
        assert_eq!(records[0].timestamp, clock.now());
    }

    #[test]
    fn test_background_worker_drains_and_shutdown_flushes() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut spooler = LogSpooler::builder()
            .log_dir(dir.path())
            .drain_interval(Duration::from_millis(10))
            .build()
            .unwrap();
        assert!(spooler.has_worker());

        for i in 0..20 {
            spooler.write_normal("message {0}", &[&i]);
        }
        assert!(spooler.shutdown(Duration::from_secs(5)));
        assert_eq!(spooler.pending(), 0);
        assert_eq!(spooler.metrics().written(), 20);
    }
}
