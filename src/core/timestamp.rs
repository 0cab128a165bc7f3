//! Timestamp formatting for entry header lines

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Format of the timestamp line preceding each entry body
///
/// # Examples
///
/// ```
/// use rust_log_spooler::TimestampFormat;
/// use chrono::{Local, TimeZone};
///
/// let at = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::TimeOnly.format(&at), "10:30:45");
/// assert_eq!(TimestampFormat::Custom("%d/%m".into()).format(&at), "08/01");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `10:30:45`; the day is already in the file name
    #[default]
    TimeOnly,

    /// `10:30:45.123`
    TimeMillis,

    /// `2025-01-08T10:30:45.123+01:00`
    Iso8601,

    /// `2025-01-08T10:30:45+01:00`
    Rfc3339,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::TimeOnly => datetime.format("%H:%M:%S").to_string(),
            TimestampFormat::TimeMillis => datetime.format("%H:%M:%S%.3f").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
            }
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_time_only_format() {
        assert_eq!(TimestampFormat::TimeOnly.format(&fixed_datetime()), "10:30:45");
    }

    #[test]
    fn test_time_millis_format() {
        assert_eq!(TimestampFormat::TimeMillis.format(&fixed_datetime()), "10:30:45.123");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45.123"));
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert!(result.starts_with("2025-01-08T10:30:45"));
        assert!(!result.contains(".123"));
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08");
    }
}
