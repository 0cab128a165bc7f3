//! Multi-producer FIFO buffering records until the drain worker takes them

use super::log_record::LogRecord;
use super::metrics::SpoolerMetrics;
use super::overflow_policy::{OverflowCallback, OverflowPolicy, QueueCapacity};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// What happened to an enqueued record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Queued after evicting the oldest record
    QueuedEvicting,
    Dropped,
}

pub struct LogQueue {
    records: Mutex<VecDeque<LogRecord>>,
    capacity: QueueCapacity,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<SpoolerMetrics>,
}

impl LogQueue {
    pub fn new(capacity: QueueCapacity, metrics: Arc<SpoolerMetrics>) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity,
            on_overflow: None,
            metrics,
        }
    }

    #[must_use]
    pub fn with_overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Append to the tail. Never blocks beyond the append itself.
    pub fn enqueue(&self, record: LogRecord) -> EnqueueOutcome {
        let outcome = {
            let mut records = self.records.lock();
            match self.capacity {
                QueueCapacity::Bounded { max, policy } if records.len() >= max => match policy {
                    OverflowPolicy::DropOldest if max > 0 => {
                        records.pop_front();
                        records.push_back(record);
                        EnqueueOutcome::QueuedEvicting
                    }
                    _ => EnqueueOutcome::Dropped,
                },
                _ => {
                    records.push_back(record);
                    EnqueueOutcome::Queued
                }
            }
        };

        match outcome {
            EnqueueOutcome::Queued => {
                self.metrics.record_enqueued();
            }
            EnqueueOutcome::QueuedEvicting => {
                self.metrics.record_enqueued();
                self.metrics.record_dropped();
            }
            EnqueueOutcome::Dropped => self.handle_drop(),
        }
        outcome
    }

    fn handle_drop(&self) {
        let dropped_count = self.metrics.record_dropped();

        let alert = matches!(
            self.capacity,
            QueueCapacity::Bounded { policy: OverflowPolicy::AlertAndDrop, .. }
        );
        // Alert on first drop and periodically thereafter
        if alert && (dropped_count == 0 || (dropped_count + 1) % 1000 == 0) {
            eprintln!(
                "[SPOOLER WARNING] Queue full ({}), {} records dropped. \
                 Consider raising the capacity or shortening the drain interval.",
                self.capacity,
                dropped_count + 1
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count + 1);
            }
        }
    }

    /// Take every queued record in FIFO order, leaving the queue empty
    pub fn drain_all(&self) -> Vec<LogRecord> {
        let mut records = self.records.lock();
        Vec::from(std::mem::take(&mut *records))
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn capacity(&self) -> QueueCapacity {
        self.capacity
    }
}
