//! Spooler configuration

use super::error::{LoggerError, Result};
use super::log_kind::{LogKind, LogKindMask};
use super::overflow_policy::QueueCapacity;
use super::suppression::DEFAULT_SUPPRESSION_WINDOW_SECS;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default drain period
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 100;

/// Consecutive internal failures tolerated before reports go to the fallback sink
pub const DEFAULT_INTERNAL_FAILURE_CAP: u32 = 5;

/// Complete spooler configuration
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes.
///
/// # Example
///
/// ```
/// use rust_log_spooler::{LogKind, SpoolerConfig};
///
/// let json = r#"{ "log_dir": "/tmp/app-logs", "skip_mask": 6 }"#;
/// let config = SpoolerConfig::from_json_str(json).unwrap();
/// assert!(config.skip_mask.intersects(LogKind::Normal));
/// assert_eq!(config.drain_interval_ms, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolerConfig {
    /// Directory holding the `yyyyMMdd.log` files
    pub log_dir: PathBuf,
    /// Kinds discarded before any processing
    pub skip_mask: LogKindMask,
    /// Minimum total elapsed time, in ms, for a segment logger to write
    pub record_min_ms: u64,
    pub drain_interval_ms: u64,
    pub suppression_window_secs: i64,
    pub internal_failure_cap: u32,
    pub queue_capacity: QueueCapacity,
    pub timestamp_format: TimestampFormat,
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("Temp").join("Log"),
            skip_mask: LogKindMask::from(LogKind::None),
            record_min_ms: 1,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            suppression_window_secs: DEFAULT_SUPPRESSION_WINDOW_SECS,
            internal_failure_cap: DEFAULT_INTERNAL_FAILURE_CAP,
            queue_capacity: QueueCapacity::Unbounded,
            timestamp_format: TimestampFormat::TimeOnly,
        }
    }
}

impl SpoolerConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SpoolerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.drain_interval_ms == 0 {
            return Err(LoggerError::config("drain_interval_ms", "must be greater than zero"));
        }
        if self.suppression_window_secs <= 0 {
            return Err(LoggerError::config(
                "suppression_window_secs",
                "must be greater than zero",
            ));
        }
        if chrono::Duration::try_seconds(self.suppression_window_secs).is_none() {
            return Err(LoggerError::config("suppression_window_secs", "out of range"));
        }
        if self.log_dir.as_os_str().is_empty() {
            return Err(LoggerError::config("log_dir", "must not be empty"));
        }
        if let QueueCapacity::Bounded { max: 0, .. } = self.queue_capacity {
            return Err(LoggerError::config(
                "queue_capacity",
                "bounded capacity must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    /// Saturates at `chrono::Duration::MAX` for values `validate` rejects
    pub fn suppression_window(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.suppression_window_secs).unwrap_or(chrono::Duration::MAX)
    }
}
