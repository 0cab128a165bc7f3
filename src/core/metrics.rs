//! Spooler metrics for observability
//!
//! Counters describing what happened to enqueued records: written,
//! skipped by the mask, absorbed by suppression, dropped on overflow,
//! plus internal failure and fallback activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for spooler observability
///
/// # Example
///
/// ```
/// use rust_log_spooler::SpoolerMetrics;
///
/// let metrics = SpoolerMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_written();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug)]
pub struct SpoolerMetrics {
    /// Records accepted by the queue
    enqueued: AtomicU64,

    /// Records written to the day file
    written: AtomicU64,

    /// Records discarded by the skip mask
    skipped: AtomicU64,

    /// Error records absorbed into a suppression window
    suppressed: AtomicU64,

    /// Records discarded because their body was empty
    discarded_empty: AtomicU64,

    /// Records dropped by a bounded queue
    dropped: AtomicU64,

    /// Failures inside the spooler itself (open, write, worker)
    internal_failures: AtomicU64,

    /// Entries written to the fallback sink
    fallback_writes: AtomicU64,

    /// Drain cycles that found work
    cycles: AtomicU64,
}

impl SpoolerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            discarded_empty: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            internal_failures: AtomicU64::new(0),
            fallback_writes: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded_empty(&self) -> u64 {
        self.discarded_empty.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn internal_failures(&self) -> u64 {
        self.internal_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_writes(&self) -> u64 {
        self.fallback_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Record an accepted record. Returns the previous value.
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_skipped(&self) -> u64 {
        self.skipped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded_empty(&self) -> u64 {
        self.discarded_empty.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_internal_failure(&self) -> u64 {
        self.internal_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback_write(&self) -> u64 {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_cycle(&self) -> u64 {
        self.cycles.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of accepted records that reached the day file (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been enqueued.
    pub fn write_rate(&self) -> f64 {
        let enqueued = self.enqueued() as f64;
        if enqueued == 0.0 {
            0.0
        } else {
            (self.written() as f64 / enqueued) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        for counter in [
            &self.enqueued,
            &self.written,
            &self.skipped,
            &self.suppressed,
            &self.discarded_empty,
            &self.dropped,
            &self.internal_failures,
            &self.fallback_writes,
            &self.cycles,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for SpoolerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SpoolerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            skipped: AtomicU64::new(self.skipped()),
            suppressed: AtomicU64::new(self.suppressed()),
            discarded_empty: AtomicU64::new(self.discarded_empty()),
            dropped: AtomicU64::new(self.dropped()),
            internal_failures: AtomicU64::new(self.internal_failures()),
            fallback_writes: AtomicU64::new(self.fallback_writes()),
            cycles: AtomicU64::new(self.cycles()),
        }
    }
}
