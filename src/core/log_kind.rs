//! Log kind definitions
//!
//! Kinds are single-bit flags. Every kind must be exactly twice the value
//! of the previous one, otherwise the skip mask stops isolating kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u32)]
pub enum LogKind {
    /// Unclassified
    None = 2,
    /// Steps, general information
    #[default]
    Normal = 4,
    /// Something that may break later processing
    Warn = 8,
    /// Failures
    Exception = 16,
}

impl LogKind {
    /// All kinds in ascending bit order
    pub const ALL: [LogKind; 4] = [
        LogKind::None,
        LogKind::Normal,
        LogKind::Warn,
        LogKind::Exception,
    ];

    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogKind::None => "NONE",
            LogKind::Normal => "NORMAL",
            LogKind::Warn => "WARN",
            LogKind::Exception => "EXCEPTION",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogKind::None => BrightBlack,
            LogKind::Normal => Green,
            LogKind::Warn => Yellow,
            LogKind::Exception => Red,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(LogKind::None),
            "NORMAL" | "INFO" => Ok(LogKind::Normal),
            "WARN" | "WARNING" => Ok(LogKind::Warn),
            "EXCEPTION" | "ERROR" => Ok(LogKind::Exception),
            _ => Err(format!("Invalid log kind: '{}'", s)),
        }
    }
}

/// A set of [`LogKind`]s combined with bitwise OR.
///
/// Used as the skip mask: a record is discarded when
/// `record.kind & mask != 0`.
///
/// ```
/// use rust_log_spooler::{LogKind, LogKindMask};
///
/// let mask = LogKind::None | LogKind::Normal;
/// assert!(mask.intersects(LogKind::Normal));
/// assert!(!mask.intersects(LogKind::Warn));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogKindMask(u32);

impl LogKindMask {
    /// Mask that skips nothing
    pub const EMPTY: LogKindMask = LogKindMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        LogKindMask(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `kind` shares a bit with this mask
    #[inline]
    pub const fn intersects(self, kind: LogKind) -> bool {
        self.0 & kind.bits() != 0
    }

    #[must_use]
    pub const fn with(self, kind: LogKind) -> Self {
        LogKindMask(self.0 | kind.bits())
    }

    #[must_use]
    pub const fn without(self, kind: LogKind) -> Self {
        LogKindMask(self.0 & !kind.bits())
    }

    /// Kinds contained in this mask, ascending
    pub fn kinds(self) -> impl Iterator<Item = LogKind> {
        LogKind::ALL.into_iter().filter(move |k| self.intersects(*k))
    }
}

impl From<LogKind> for LogKindMask {
    fn from(kind: LogKind) -> Self {
        LogKindMask(kind.bits())
    }
}

impl BitOr for LogKind {
    type Output = LogKindMask;

    fn bitor(self, rhs: LogKind) -> LogKindMask {
        LogKindMask(self.bits() | rhs.bits())
    }
}

impl BitOr<LogKind> for LogKindMask {
    type Output = LogKindMask;

    fn bitor(self, rhs: LogKind) -> LogKindMask {
        self.with(rhs)
    }
}

impl BitOr for LogKindMask {
    type Output = LogKindMask;

    fn bitor(self, rhs: LogKindMask) -> LogKindMask {
        LogKindMask(self.0 | rhs.0)
    }
}

impl BitOrAssign<LogKind> for LogKindMask {
    fn bitor_assign(&mut self, rhs: LogKind) {
        self.0 |= rhs.bits();
    }
}

impl BitAnd<LogKind> for LogKindMask {
    type Output = u32;

    fn bitand(self, rhs: LogKind) -> u32 {
        self.0 & rhs.bits()
    }
}

impl fmt::Display for LogKindMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        let names: Vec<&str> = self.kinds().map(|k| k.to_str()).collect();
        write!(f, "{}", names.join(" | "))
    }
}
