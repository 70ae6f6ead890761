//! Tests for block-day classification.

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use agenda_engine::calendar::{blocked_days, day_interval};
use agenda_engine::{classify_day, is_day_blocked, is_day_blocked_in, DayBlockState, TimeInterval};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn block(from: (u32, u32), to: (u32, u32)) -> TimeInterval {
    TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, from.0, from.1, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, to.0, to.1, 0, 0).unwrap(),
    )
    .unwrap()
}

#[test]
fn block_spanning_midnight_blocks_the_next_day() {
    let blocks = vec![block((15, 22), (16, 1))];
    assert!(is_day_blocked(day(16), &blocks));
    assert!(is_day_blocked(day(15), &blocks));
}

#[test]
fn block_ending_at_midnight_does_not_block_the_day() {
    let blocks = vec![block((15, 20), (16, 0))];
    assert!(!is_day_blocked(day(16), &blocks));
    assert!(is_day_blocked(day(15), &blocks));
}

#[test]
fn no_blocks_means_nothing_is_blocked() {
    assert!(!is_day_blocked(day(16), &[]));
    assert_eq!(classify_day(day(16), &Tz::UTC, &[]), DayBlockState::Free);
}

#[test]
fn day_is_read_in_the_professional_zone() {
    // 01:00-02:00 UTC on the 16th is 22:00-23:00 on the 15th in Sao Paulo (UTC-3).
    let blocks = vec![block((16, 1), (16, 2))];
    let zone: Tz = "America/Sao_Paulo".parse().unwrap();

    assert!(is_day_blocked(day(16), &blocks));
    assert!(!is_day_blocked_in(day(16), &zone, &blocks));
    assert!(is_day_blocked_in(day(15), &zone, &blocks));
}

#[test]
fn day_interval_spans_local_midnights() {
    let zone: Tz = "America/Sao_Paulo".parse().unwrap();
    let whole = day_interval(day(16), &zone);
    assert_eq!(whole.start, Utc.with_ymd_and_hms(2026, 3, 16, 3, 0, 0).unwrap());
    assert_eq!(whole.end, Utc.with_ymd_and_hms(2026, 3, 17, 3, 0, 0).unwrap());
}

#[test]
fn day_interval_is_23_hours_on_spring_forward() {
    let zone: Tz = "America/New_York".parse().unwrap();
    let whole = day_interval(day(8), &zone);
    assert_eq!(whole.duration_minutes(), 23 * 60);
}

#[test]
fn multi_day_block_fully_covers_inner_day() {
    let blocks = vec![block((15, 20), (17, 0))];
    assert_eq!(classify_day(day(16), &Tz::UTC, &blocks), DayBlockState::Full);
    assert_eq!(classify_day(day(15), &Tz::UTC, &blocks), DayBlockState::Partial);
    assert_eq!(classify_day(day(17), &Tz::UTC, &blocks), DayBlockState::Free);
}

#[test]
fn adjacent_blocks_merge_into_full_day() {
    let blocks = vec![block((16, 12), (17, 0)), block((16, 0), (16, 12))];
    assert_eq!(classify_day(day(16), &Tz::UTC, &blocks), DayBlockState::Full);
}

#[test]
fn gap_between_blocks_is_partial() {
    let blocks = vec![block((16, 0), (16, 11)), block((16, 12), (17, 0))];
    assert_eq!(classify_day(day(16), &Tz::UTC, &blocks), DayBlockState::Partial);
}

#[test]
fn month_view_lists_only_blocked_days() {
    let blocks = vec![block((15, 22), (16, 1)), block((20, 0), (21, 0))];

    let days = blocked_days(2026, 3, &Tz::UTC, &blocks);

    assert_eq!(
        days,
        vec![
            (day(15), DayBlockState::Partial),
            (day(16), DayBlockState::Partial),
            (day(20), DayBlockState::Full),
        ]
    );
}

#[test]
fn month_view_of_invalid_month_is_empty() {
    assert!(blocked_days(2026, 13, &Tz::UTC, &[block((16, 0), (17, 0))]).is_empty());
}
