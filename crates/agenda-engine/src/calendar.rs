//! Block-day classification for calendar views.
//!
//! A day is treated as the half-open interval between its own midnight and the next
//! day's midnight. A block that ends exactly at a day's midnight does not touch that
//! day. Classification only annotates the calendar; booking eligibility is always
//! decided against exact times by the slot generator.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{resolve_local, DstPolicy};
use crate::interval::{self, overlaps, TimeInterval};

/// How much of a calendar day is covered by blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBlockState {
    Free,
    Partial,
    Full,
}

/// The UTC instant of local midnight starting `day` in `zone`.
pub(crate) fn local_midnight(day: NaiveDate, zone: &Tz) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    resolve_local(naive, zone, DstPolicy::Earliest).unwrap_or_else(|| naive.and_utc())
}

/// The interval `[midnight(day), midnight(day + 1))` in `zone`.
pub fn day_interval(day: NaiveDate, zone: &Tz) -> TimeInterval {
    let start = local_midnight(day, zone);
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    let end = local_midnight(next, zone);
    TimeInterval { start, end }
}

/// `true` when any block overlaps the UTC day.
pub fn is_day_blocked(day: NaiveDate, blocks: &[TimeInterval]) -> bool {
    is_day_blocked_in(day, &Tz::UTC, blocks)
}

/// `true` when any block overlaps the day as observed in `zone`.
pub fn is_day_blocked_in(day: NaiveDate, zone: &Tz, blocks: &[TimeInterval]) -> bool {
    let whole_day = day_interval(day, zone);
    blocks.iter().any(|block| overlaps(&whole_day, block))
}

/// Classify a day as free, partially blocked or fully blocked.
pub fn classify_day(day: NaiveDate, zone: &Tz, blocks: &[TimeInterval]) -> DayBlockState {
    let whole_day = day_interval(day, zone);

    let clipped = blocks
        .iter()
        .filter(|block| overlaps(&whole_day, block))
        .map(|block| TimeInterval {
            start: block.start.max(whole_day.start),
            end: block.end.min(whole_day.end),
        });
    let merged = interval::merge(clipped);

    match merged.as_slice() {
        [] => DayBlockState::Free,
        [only] if only.start == whole_day.start && only.end == whole_day.end => DayBlockState::Full,
        _ => DayBlockState::Partial,
    }
}

/// Every blocked day of a month with its classification, in date order.
///
/// Free days are omitted. An invalid `year`/`month` yields an empty list.
pub fn blocked_days(
    year: i32,
    month: u32,
    zone: &Tz,
    blocks: &[TimeInterval],
) -> Vec<(NaiveDate, DayBlockState)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| day.month() == month)
        .filter_map(|day| match classify_day(day, zone, blocks) {
            DayBlockState::Free => None,
            state => Some((day, state)),
        })
        .collect()
}
