//! Drain worker
//!
//! One cycle takes every queued record, filters and suppresses it, and
//! writes what is left to the current day file. The file is opened at the
//! start of the cycle and closed at its end.

use super::{
    appender::{Appender, RenderedEntry},
    error::{LoggerError, Result},
    log_kind::LogKindMask,
    log_record::LogRecord,
    spooler::SpoolerCore,
    suppression::{SuppressionCache, Verdict},
};
use crate::appenders::DailyFileAppender;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Counts for one drain cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub drained: usize,
    /// Records carried over from a cycle whose write failed
    pub retried: usize,
    pub written: usize,
    /// Discarded by the skip mask
    pub skipped: usize,
    pub suppressed: usize,
    /// Discarded because the composed body was empty
    pub discarded: usize,
    /// Records whose day file write failed
    pub failed: usize,
    /// The day file could not be opened and the batch went to the fallback sink
    pub fallback: bool,
}

impl CycleReport {
    pub fn is_idle(&self) -> bool {
        self.drained == 0 && self.retried == 0
    }
}

/// What a single record turned into
enum Disposition {
    Skipped,
    Suppressed,
    Empty,
    /// Final body and repeat count, error already folded in
    Write(LogRecord),
}

/// Consumer state; only ever touched under the spooler's consumer lock
pub(crate) struct DrainWorker {
    suppression: SuppressionCache,
    appenders: Vec<Box<dyn Appender>>,
    /// Rendered records whose write failed below the failure cap
    retry: Vec<LogRecord>,
}

impl DrainWorker {
    pub(crate) fn new(window: chrono::Duration, appenders: Vec<Box<dyn Appender>>) -> Self {
        Self {
            suppression: SuppressionCache::new(window),
            appenders,
            retry: Vec::new(),
        }
    }

    pub(crate) fn run_cycle(&mut self, core: &SpoolerCore) -> Result<CycleReport> {
        let mut report = CycleReport::default();
        if core.queue.is_empty() && self.retry.is_empty() {
            return Ok(report);
        }
        core.metrics.record_cycle();

        let (dir, skip_mask, timestamp_format) = {
            let config = core.config.read();
            (config.log_dir.clone(), config.skip_mask, config.timestamp_format.clone())
        };

        let date = core.now().date_naive();
        let mut file = match DailyFileAppender::open(&dir, date, timestamp_format) {
            Ok(file) => Some(file),
            Err(e) if core.in_fallback() => {
                eprintln!("[SPOOLER ERROR] {}; writing batch to fallback sink", e);
                report.fallback = true;
                None
            }
            // Records stay queued for the next cycle
            Err(e) => return Err(e),
        };

        let mut pending = std::mem::take(&mut self.retry);
        report.retried = pending.len();

        let records = core.queue.drain_all();
        report.drained = records.len();

        for record in records {
            match self.classify(record, skip_mask) {
                Disposition::Skipped => {
                    core.metrics.record_skipped();
                    report.skipped += 1;
                }
                Disposition::Suppressed => {
                    core.metrics.record_suppressed();
                    report.suppressed += 1;
                }
                Disposition::Empty => {
                    core.metrics.record_discarded_empty();
                    report.discarded += 1;
                }
                Disposition::Write(rendered) => pending.push(rendered),
            }
        }

        for record in pending {
            self.write_one(core, file.as_mut(), record, &mut report);
        }

        if let Some(file) = file {
            file.close()?;
        }
        for appender in &mut self.appenders {
            if let Err(e) = appender.flush() {
                core.report_internal(&e);
            }
        }

        Ok(report)
    }

    /// Write one rendered record to the day file, or the fallback sink when
    /// there is no day file this cycle.
    ///
    /// A failed write is reported and the record is kept for the next cycle,
    /// unless the failure cap has been reached, in which case it goes to the
    /// fallback sink. Only a successful write reaches the extra appenders and
    /// the observer.
    fn write_one(
        &mut self,
        core: &SpoolerCore,
        file: Option<&mut DailyFileAppender>,
        record: LogRecord,
        report: &mut CycleReport,
    ) {
        let entry = RenderedEntry {
            timestamp: record.timestamp,
            kind: record.kind,
            body: &record.body,
            repeat_count: record.repeat_count,
        };

        let Some(file) = file else {
            core.write_fallback(&entry);
            return;
        };

        let outcome = match catch_unwind(AssertUnwindSafe(|| file.append(&entry))) {
            Ok(result) => result,
            Err(panic_info) => Err(LoggerError::worker_panic(file.name(), &*panic_info)),
        };

        match outcome {
            Ok(()) => {
                core.metrics.record_written();
                core.reset_failures();
                report.written += 1;
                self.fan_out(core, &entry);
                core.notify(entry.kind, entry.body);
            }
            Err(e) => {
                report.failed += 1;
                core.report_internal(&e);
                if core.in_fallback() {
                    core.write_fallback(&entry);
                } else {
                    self.retry.push(record);
                }
            }
        }
    }

    /// Skip mask, then suppression for error records, then the empty check
    fn classify(&mut self, record: LogRecord, skip_mask: LogKindMask) -> Disposition {
        if skip_mask.intersects(record.kind) {
            return Disposition::Skipped;
        }

        let mut body = record.composed_body();
        let mut repeat_count = record.repeat_count;
        if record.error.is_some() {
            match self.suppression.check(&body, record.timestamp) {
                Verdict::FirstSeen => {}
                Verdict::Suppressed { .. } => return Disposition::Suppressed,
                Verdict::Reopened {
                    occurrences,
                    annotation,
                } => {
                    body.push(' ');
                    body.push_str(&annotation);
                    repeat_count = occurrences;
                }
            }
        }

        if body.is_empty() {
            return Disposition::Empty;
        }
        Disposition::Write(LogRecord {
            body,
            error: None,
            repeat_count,
            ..record
        })
    }

    fn fan_out(&mut self, core: &SpoolerCore, entry: &RenderedEntry<'_>) {
        for appender in &mut self.appenders {
            match catch_unwind(AssertUnwindSafe(|| appender.append(entry))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => core.report_internal(&e),
                Err(panic_info) => {
                    let name = appender.name().to_string();
                    core.report_internal(&LoggerError::worker_panic(name, &*panic_info));
                }
            }
        }
    }
}
