//! Detect overlapping intervals between two schedules.
//!
//! Performs pairwise comparison between two interval lists to find time overlaps.
//! Adjacent intervals (where one ends exactly when another starts) are NOT conflicts.

use serde::Serialize;

use crate::interval::{overlap_minutes, overlaps, TimeInterval};

/// A detected conflict between two intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub a: TimeInterval,
    pub b: TimeInterval,
    pub overlap_minutes: i64,
}

/// Find all pairwise conflicts between two interval lists.
///
/// Results are ordered by position in `a`, then by position in `b`.
pub fn find_conflicts(a: &[TimeInterval], b: &[TimeInterval]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for x in a {
        for y in b {
            if overlaps(x, y) {
                conflicts.push(Conflict {
                    a: *x,
                    b: *y,
                    overlap_minutes: overlap_minutes(x, y),
                });
            }
        }
    }

    conflicts
}

/// First interval in `existing` that overlaps `candidate`, if any.
///
/// Used to reject a proposed appointment or block before it is submitted.
pub fn first_conflict<'a>(
    candidate: &TimeInterval,
    existing: &'a [TimeInterval],
) -> Option<&'a TimeInterval> {
    existing.iter().find(|iv| overlaps(candidate, iv))
}
