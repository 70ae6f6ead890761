//! DST transition policies for wall-clock working hours.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Policy for local times that fall in a DST gap.
///
/// Ambiguous local times (the repeated hour when clocks fall back) always resolve
/// to the earliest instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop local times that do not exist (e.g., 02:30 during spring forward).
    Skip,
    /// Move to the first valid minute after the gap.
    ShiftForward,
    /// Like `ShiftForward` for gaps; earliest instant for ambiguous times.
    #[default]
    Earliest,
}

/// Longest DST gap we search across when shifting forward.
const MAX_GAP_MINUTES: i64 = 180;

/// Resolve a local wall-clock time in `zone` to a UTC instant.
///
/// Returns `None` only when the local time does not exist and the policy is `Skip`.
pub fn resolve_local(naive: NaiveDateTime, zone: &Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward | DstPolicy::Earliest => (1..=MAX_GAP_MINUTES)
                .filter_map(|m| naive.checked_add_signed(Duration::minutes(m)))
                .find_map(|candidate| match zone.from_local_datetime(&candidate) {
                    LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                    LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
                    LocalResult::None => None,
                }),
        },
    }
}
