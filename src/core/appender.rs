//! Appender trait for written entries

use super::{error::Result, log_kind::LogKind};
use chrono::{DateTime, Local};

/// An entry that passed filtering and suppression, ready to be written
#[derive(Debug, Clone, Copy)]
pub struct RenderedEntry<'a> {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
    /// Composed body, including any suppression annotation
    pub body: &'a str,
    /// Sightings folded into this entry by suppression, 0 for most entries
    pub repeat_count: u32,
}

pub trait Appender: Send {
    fn append(&mut self, entry: &RenderedEntry<'_>) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
