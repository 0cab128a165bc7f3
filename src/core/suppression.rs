//! Time-windowed suppression of repeated error records
//!
//! Entries are keyed by the SHA-256 of the composed body and are never
//! evicted; the map grows with the number of distinct error bodies seen.

use chrono::{DateTime, Duration, Local};
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Default length of a suppression window, in seconds
pub const DEFAULT_SUPPRESSION_WINDOW_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionEntry {
    pub last_seen: DateTime<Local>,
    pub occurrences: u32,
}

/// Outcome of checking one error body against the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// First sighting; write the body unchanged
    FirstSeen,
    /// Inside the window; absorbed into the running count
    Suppressed { occurrences: u32 },
    /// Window elapsed; write with the annotation and start a new window
    Reopened { occurrences: u32, annotation: String },
}

impl Verdict {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Verdict::Suppressed { .. })
    }
}

pub struct SuppressionCache {
    entries: HashMap<[u8; 32], SuppressionEntry>,
    window: Duration,
}

impl SuppressionCache {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    pub fn key(body: &str) -> [u8; 32] {
        Sha256::digest(body.as_bytes()).into()
    }

    /// Check `body` seen at `at`.
    ///
    /// Every sighting after the first bumps the count, including the one
    /// that closes the window, so the annotation reports all sightings
    /// since the last written line.
    pub fn check(&mut self, body: &str, at: DateTime<Local>) -> Verdict {
        let window = self.window;
        let entry = match self.entries.entry(Self::key(body)) {
            Entry::Vacant(slot) => {
                slot.insert(SuppressionEntry {
                    last_seen: at,
                    occurrences: 0,
                });
                return Verdict::FirstSeen;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        entry.occurrences += 1;
        if at - entry.last_seen < window {
            return Verdict::Suppressed {
                occurrences: entry.occurrences,
            };
        }

        let occurrences = entry.occurrences;
        entry.occurrences = 0;
        entry.last_seen = at;
        Verdict::Reopened {
            occurrences,
            annotation: annotate(occurrences, window),
        }
    }

    pub fn get(&self, body: &str) -> Option<&SuppressionEntry> {
        self.entries.get(&Self::key(body))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `(triggered N times in W minutes)`; windows under a minute are given in seconds
fn annotate(occurrences: u32, window: Duration) -> String {
    if window < Duration::minutes(1) {
        format!("(triggered {} times in {} seconds)", occurrences, window.num_seconds())
    } else {
        format!("(triggered {} times in {} minutes)", occurrences, window.num_minutes())
    }
}

impl Default for SuppressionCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SUPPRESSION_WINDOW_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 8, 10, 0, 0).single().expect("valid datetime")
    }

    #[test]
    fn test_first_sighting_is_written() {
        let mut cache = SuppressionCache::default();
        assert_eq!(cache.check("boom", t0()), Verdict::FirstSeen);
        assert_eq!(cache.get("boom").map(|e| e.occurrences), Some(0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_repeats_inside_window_are_suppressed() {
        let mut cache = SuppressionCache::default();
        cache.check("boom", t0());
        assert_eq!(
            cache.check("boom", t0() + Duration::minutes(1)),
            Verdict::Suppressed { occurrences: 1 }
        );
        assert!(cache.check("boom", t0() + Duration::minutes(14)).is_suppressed());
        // Window is measured from the last written sighting
        assert_eq!(cache.get("boom").map(|e| e.last_seen), Some(t0()));
    }

    #[test]
    fn test_window_elapsed_reopens_with_annotation() {
        let mut cache = SuppressionCache::default();
        cache.check("boom", t0());
        cache.check("boom", t0() + Duration::minutes(1));

        let later = t0() + Duration::minutes(16);
        assert_eq!(
            cache.check("boom", later),
            Verdict::Reopened {
                occurrences: 2,
                annotation: "(triggered 2 times in 15 minutes)".to_string(),
            }
        );
        let entry = cache.get("boom").copied().expect("entry kept");
        assert_eq!(entry.occurrences, 0);
        assert_eq!(entry.last_seen, later);

        // A fresh window starts at the reopen time
        assert!(cache.check("boom", later + Duration::minutes(5)).is_suppressed());
    }

    #[test]
    fn test_exact_window_boundary_reopens() {
        let mut cache = SuppressionCache::new(Duration::minutes(15));
        cache.check("boom", t0());
        assert!(matches!(
            cache.check("boom", t0() + Duration::minutes(15)),
            Verdict::Reopened { occurrences: 1, .. }
        ));
    }

    #[test]
    fn test_short_window_annotation_uses_seconds() {
        let mut cache = SuppressionCache::new(Duration::seconds(30));
        cache.check("boom", t0());
        cache.check("boom", t0() + Duration::seconds(10));

        match cache.check("boom", t0() + Duration::seconds(45)) {
            Verdict::Reopened { annotation, .. } => {
                assert_eq!(annotation, "(triggered 2 times in 30 seconds)");
            }
            other => panic!("expected reopen, got {:?}", other),
        }
        assert_eq!(annotate(3, Duration::minutes(1)), "(triggered 3 times in 1 minutes)");
    }

    #[test]
    fn test_distinct_bodies_are_independent() {
        let mut cache = SuppressionCache::default();
        assert_eq!(cache.check("a", t0()), Verdict::FirstSeen);
        assert_eq!(cache.check("b", t0()), Verdict::FirstSeen);
        assert_eq!(cache.len(), 2);
    }
}
