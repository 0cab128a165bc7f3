//! Log record structure

use super::error::RecordedError;
use super::log_kind::LogKind;
use chrono::{DateTime, Local};

/// A queued log record.
///
/// Owned by the queue from enqueue until a drain cycle takes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
    pub body: String,
    pub error: Option<RecordedError>,
    /// Sightings absorbed into this record by the suppression cache; set
    /// when a closed window lets the record through with its annotation
    pub repeat_count: u32,
}

impl LogRecord {
    pub fn new(kind: LogKind, timestamp: DateTime<Local>, body: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind,
            body: body.into(),
            error: None,
            repeat_count: 0,
        }
    }

    /// A record carrying an error; kind is `Exception`
    pub fn from_error(
        timestamp: DateTime<Local>,
        error: RecordedError,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            kind: LogKind::Exception,
            body: message.into(),
            error: Some(error),
            repeat_count: 0,
        }
    }

    /// Fold the attached error into the body.
    ///
    /// An empty body becomes `"{message}:\n{trace}"`; otherwise the body is
    /// used as a heading: `"{body}:\n{message}\n{trace}"`. Empty trace lines
    /// are left out. Records without an error keep their body.
    pub fn composed_body(&self) -> String {
        let Some(error) = &self.error else {
            return self.body.clone();
        };

        let capacity = self.body.len() + error.message.len() + error.trace.len() + 4;
        let mut composed = String::with_capacity(capacity);
        if self.body.is_empty() {
            composed.push_str(&error.message);
            composed.push(':');
        } else {
            composed.push_str(&self.body);
            composed.push_str(":\n");
            composed.push_str(&error.message);
        }
        if !error.trace.is_empty() {
            composed.push('\n');
            composed.push_str(&error.trace);
        }
        composed
    }
}
