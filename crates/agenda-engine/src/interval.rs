//! Half-open time intervals and the overlap predicate.
//!
//! Every booking decision in the engine reduces to one rule: two intervals
//! `[a.start, a.end)` and `[b.start, b.end)` overlap iff
//! `a.start < b.end && b.start < a.end`. Touching endpoints do NOT overlap, so an
//! appointment ending exactly when a block starts is not a conflict.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build an interval from a start instant and a positive length in minutes.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDuration` if the length is not positive or the end
    /// falls outside the representable range.
    pub fn from_start(start: DateTime<Utc>, duration_minutes: i64) -> Result<Self> {
        let end = (duration_minutes > 0)
            .then(|| Duration::try_minutes(duration_minutes))
            .flatten()
            .and_then(|length| start.checked_add_signed(length))
            .ok_or(EngineError::InvalidDuration(duration_minutes))?;
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// `true` when `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self, other)
    }
}

/// Strict half-open overlap test.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Length of the intersection of `a` and `b` in minutes; `0` when they do not overlap.
pub fn overlap_minutes(a: &TimeInterval, b: &TimeInterval) -> i64 {
    if !overlaps(a, b) {
        return 0;
    }
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (end - start).num_minutes()
}

/// Merge overlapping or adjacent intervals into a sorted, disjoint list.
pub(crate) fn merge(intervals: impl IntoIterator<Item = TimeInterval>) -> Vec<TimeInterval> {
    let mut sorted: Vec<TimeInterval> = intervals.into_iter().collect();
    sorted.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        if let Some(last) = merged.last_mut() {
            if iv.start <= last.end {
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
    }

    #[test]
    fn merge_coalesces_adjacent_and_overlapping() {
        let merged = merge([
            TimeInterval::new(at(13, 0), at(14, 0)).unwrap(),
            TimeInterval::new(at(9, 0), at(10, 0)).unwrap(),
            TimeInterval::new(at(10, 0), at(11, 0)).unwrap(),
            TimeInterval::new(at(10, 30), at(12, 0)).unwrap(),
        ]);
        assert_eq!(
            merged,
            vec![
                TimeInterval::new(at(9, 0), at(12, 0)).unwrap(),
                TimeInterval::new(at(13, 0), at(14, 0)).unwrap(),
            ]
        );
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge(Vec::new()).is_empty());
    }
}
