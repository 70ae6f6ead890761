//! Bookable slot generation.
//!
//! Walks a day's working window in fixed strides of one service duration and keeps
//! every candidate that overlaps neither an existing appointment nor a block. The
//! trailing partial slot that would run past the end of the window is discarded.
//!
//! The result is a lazy, single-pass iterator. It holds borrowed inputs and is never
//! cached: callers regenerate after any change to appointments or blocks.

use std::iter::FusedIterator;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{EngineError, Result};
use crate::hours::{hours_for_date, WorkingHours};
use crate::interval::{overlaps, TimeInterval};

/// Generate the bookable slots of `date`, with working hours read as UTC wall-clock.
///
/// `appointments` must already exclude cancelled appointments (see
/// [`busy_intervals`](crate::appointment::busy_intervals)).
///
/// # Errors
/// Returns `EngineError::InvalidDuration` if `duration_minutes <= 0` or out of range.
pub fn generate_slots<'a>(
    hours: &[WorkingHours],
    duration_minutes: i64,
    appointments: &'a [TimeInterval],
    blocks: &'a [TimeInterval],
    date: NaiveDate,
) -> Result<Slots<'a>> {
    generate_slots_in(
        hours,
        duration_minutes,
        appointments,
        blocks,
        date,
        Tz::UTC,
        DstPolicy::default(),
    )
}

/// Generate the bookable slots of `date` with working hours read as wall-clock time
/// in `zone`.
///
/// The window's bounds are resolved to UTC and walked in real time, so every slot is
/// exactly one service duration long and the repeated hour of a fall-back day is
/// offered twice. Bounds inside a DST gap move to the first valid minute after it.
/// Under [`DstPolicy::Skip`] a slot whose wall-clock length differs from its real
/// length (one straddling a transition) is dropped.
///
/// # Errors
/// Returns `EngineError::InvalidDuration` if `duration_minutes <= 0` or the duration
/// is too large to represent.
pub fn generate_slots_in<'a>(
    hours: &[WorkingHours],
    duration_minutes: i64,
    appointments: &'a [TimeInterval],
    blocks: &'a [TimeInterval],
    date: NaiveDate,
    zone: Tz,
    policy: DstPolicy,
) -> Result<Slots<'a>> {
    let step = (duration_minutes > 0)
        .then(|| Duration::try_minutes(duration_minutes))
        .flatten()
        .ok_or(EngineError::InvalidDuration(duration_minutes))?;

    let window = hours_for_date(hours, date)
        .filter(|h| h.start_time < h.end_time)
        .and_then(|h| {
            let start = resolve_local(date.and_time(h.start_time), &zone, DstPolicy::ShiftForward)?;
            let end = resolve_local(date.and_time(h.end_time), &zone, DstPolicy::ShiftForward)?;
            Some((start, end))
        });
    let (cursor, window_end) = window.unwrap_or((DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MIN_UTC));

    Ok(Slots {
        cursor,
        window_end,
        step,
        zone,
        policy,
        appointments,
        blocks,
    })
}

/// Lazy sequence of bookable slots in chronological order.
#[derive(Debug)]
pub struct Slots<'a> {
    cursor: DateTime<Utc>,
    window_end: DateTime<Utc>,
    step: Duration,
    zone: Tz,
    policy: DstPolicy,
    appointments: &'a [TimeInterval],
    blocks: &'a [TimeInterval],
}

impl Slots<'_> {
    fn is_free(&self, slot: &TimeInterval) -> bool {
        !self.appointments.iter().any(|a| overlaps(slot, a))
            && !self.blocks.iter().any(|b| overlaps(slot, b))
    }

    fn wall_clock_length(&self, slot: &TimeInterval) -> Duration {
        slot.end.with_timezone(&self.zone).naive_local() - slot.start.with_timezone(&self.zone).naive_local()
    }
}

impl Iterator for Slots<'_> {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        while let Some(end) = self.cursor.checked_add_signed(self.step) {
            if end > self.window_end {
                break;
            }
            let slot = TimeInterval {
                start: self.cursor,
                end,
            };
            self.cursor = end;

            if self.policy == DstPolicy::Skip && self.wall_clock_length(&slot) != self.step {
                continue;
            }
            if self.is_free(&slot) {
                return Some(slot);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.window_end - self.cursor).num_minutes().max(0);
        let upper = remaining / self.step.num_minutes().max(1);
        (0, Some(upper as usize))
    }
}

impl FusedIterator for Slots<'_> {}

/// Local `HH:MM` start of a slot, the format the booking screen lists.
pub fn format_slot_start(slot: &TimeInterval, zone: &Tz) -> String {
    slot.start.with_timezone(zone).format("%H:%M").to_string()
}
