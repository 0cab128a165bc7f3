//! Queue capacity and overflow handling
//!
//! The queue is unbounded by default and producers never wait on the
//! drain worker. A bounded capacity can be configured; when it is full the
//! overflow policy decides which record is lost. None of the policies
//! block the producer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy for a full bounded queue
///
/// # Example
///
/// ```
/// use rust_log_spooler::{OverflowPolicy, QueueCapacity};
///
/// let capacity = QueueCapacity::bounded(10_000, OverflowPolicy::DropOldest);
/// assert_eq!(capacity.max(), Some(10_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Discard the incoming record
    DropNewest,

    /// Evict the oldest queued record to make room
    DropOldest,

    /// Discard the incoming record and alert via callback and stderr
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// How many records the queue may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueCapacity {
    #[default]
    Unbounded,
    Bounded { max: usize, policy: OverflowPolicy },
}

impl QueueCapacity {
    #[must_use]
    pub fn bounded(max: usize, policy: OverflowPolicy) -> Self {
        QueueCapacity::Bounded { max, policy }
    }

    #[must_use]
    pub fn max(&self) -> Option<usize> {
        match self {
            QueueCapacity::Unbounded => None,
            QueueCapacity::Bounded { max, .. } => Some(*max),
        }
    }
}

impl fmt::Display for QueueCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueCapacity::Unbounded => write!(f, "Unbounded"),
            QueueCapacity::Bounded { max, policy } => write!(f, "Bounded({}, {})", max, policy),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when records are dropped because the queue is full.
/// The parameter is the total count of dropped records so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
