//! Elapsed-segment logger
//!
//! Times the steps of an operation and logs them as one record, but only
//! when the operation as a whole took at least the spooler's
//! `record_min_ms`. Fast runs leave no trace in the log.

use super::{
    log_kind::LogKind,
    spooler::SpoolerHandle,
    template::format_template,
};
use chrono::{DateTime, Local};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Idle,
    Begun,
}

/// Buffers timed segment lines for a single operation
///
/// # Example
///
/// ```
/// use rust_log_spooler::prelude::*;
///
/// let dir = tempfile::tempdir().unwrap();
/// let spooler = LogSpooler::builder().log_dir(dir.path()).manual_drain().build().unwrap();
///
/// let mut timer = spooler.segment("import batch");
/// timer.commit("parsed input");
/// timer.commit_fmt("stored {0} rows", &[&120]);
/// timer.flush();
/// ```
pub struct ElapsedSegmentLogger {
    spooler: SpoolerHandle,
    state: SegmentState,
    start: DateTime<Local>,
    total_ms: f64,
    last_segment_ms: f64,
    lines: Vec<String>,
}

impl ElapsedSegmentLogger {
    /// An idle logger; the first `begin` or `commit` starts the clock
    pub fn new(spooler: SpoolerHandle) -> Self {
        let start = spooler.now();
        Self {
            spooler,
            state: SegmentState::Idle,
            start,
            total_ms: 0.0,
            last_segment_ms: 0.0,
            lines: Vec::new(),
        }
    }

    /// Start timing. A non-empty title adds a `----- {title} -----` banner.
    pub fn begin(&mut self, title: &str) {
        self.reset();
        self.start = self.spooler.now();
        self.state = SegmentState::Begun;
        if !title.is_empty() {
            self.lines.push(format!("----- {} -----", title));
        }
    }

    /// Close the current segment.
    ///
    /// Empty `text` only advances the timing.
    pub fn commit(&mut self, text: &str) {
        if self.state == SegmentState::Idle {
            self.begin("");
        }

        let total_ms = elapsed_ms(self.start, self.spooler.now());
        self.last_segment_ms = total_ms - self.total_ms;
        self.total_ms = total_ms;

        if !text.is_empty() {
            self.lines.push(format!(
                "{} (segment: {:.2}ms, total: {:.2}ms)",
                text, self.last_segment_ms, self.total_ms
            ));
        }
    }

    /// Like [`commit`](Self::commit) with a formatted text; the raw template
    /// is used if formatting fails
    pub fn commit_fmt(&mut self, template: &str, args: &[&dyn Display]) {
        let text = match format_template(template, args) {
            Ok(text) => text,
            Err(e) => {
                self.spooler.write_error(&e);
                template.to_string()
            }
        };
        self.commit(&text);
    }

    /// Submit the buffer as one `Normal` record if the total elapsed time
    /// reached the threshold, otherwise discard it. Either way the logger
    /// returns to `Idle`.
    ///
    /// Returns `true` if a record was submitted.
    pub fn flush(&mut self) -> bool {
        let threshold = self.spooler.record_min_ms() as f64;
        let submitted = self.total_ms >= threshold && !self.lines.is_empty();
        if submitted {
            self.spooler.log(LogKind::Normal, self.lines.join("\n"));
        }
        self.reset();
        submitted
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    pub fn last_segment_ms(&self) -> f64 {
        self.last_segment_ms
    }

    /// Text that a flush would submit right now
    pub fn buffered(&self) -> String {
        self.lines.join("\n")
    }

    fn reset(&mut self) {
        self.state = SegmentState::Idle;
        self.total_ms = 0.0;
        self.last_segment_ms = 0.0;
        self.lines.clear();
    }
}

fn elapsed_ms(from: DateTime<Local>, to: DateTime<Local>) -> f64 {
    let elapsed = to - from;
    match elapsed.num_microseconds() {
        Some(us) => us as f64 / 1000.0,
        None => elapsed.num_milliseconds() as f64,
    }
}
