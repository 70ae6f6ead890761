//! Property-based tests for the overlap predicate and slot generation.
//!
//! These tests verify invariants that should hold for *any* input, not just the
//! specific examples in `overlap_tests.rs` and `slots_tests.rs`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;
use agenda_engine::{generate_slots, overlaps, TimeInterval, WorkingHours};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// An interval starting within the day at 5-minute granularity, 5 minutes to 4 hours long.
fn arb_interval() -> impl Strategy<Value = TimeInterval> {
    (0i64..288, 1i64..=48).prop_map(|(start_step, len_steps)| {
        let start = base() + Duration::minutes(start_step * 5);
        TimeInterval::new(start, start + Duration::minutes(len_steps * 5)).unwrap()
    })
}

fn arb_duration() -> impl Strategy<Value = i64> {
    prop_oneof![Just(15i64), Just(20), Just(30), Just(45), Just(60), Just(90)]
}

/// Working window on the hour, `start < end`.
fn arb_window() -> impl Strategy<Value = (u32, u32)> {
    (0u32..23).prop_flat_map(|start| (Just(start), (start + 1)..=23))
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: overlap is symmetric
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }
}

// ---------------------------------------------------------------------------
// Property 2: every non-empty interval overlaps itself
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_is_reflexive(a in arb_interval()) {
        prop_assert!(overlaps(&a, &a));
    }
}

// ---------------------------------------------------------------------------
// Property 3: intervals that merely touch never overlap
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn touching_never_overlaps(a in arb_interval(), len in 1i64..240) {
        let b = TimeInterval::new(a.end, a.end + Duration::minutes(len)).unwrap();
        prop_assert!(!overlaps(&a, &b));
        prop_assert!(!overlaps(&b, &a));
    }
}

// ---------------------------------------------------------------------------
// Property 4: generated slots avoid every appointment and block
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_never_overlap_inputs(
        window in arb_window(),
        duration in arb_duration(),
        appointments in prop::collection::vec(arb_interval(), 0..6),
        blocks in prop::collection::vec(arb_interval(), 0..4),
    ) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        let hours = vec![WorkingHours::new(
            0,
            NaiveTime::from_hms_opt(window.0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(window.1, 0, 0).unwrap(),
            true,
        ).unwrap()];

        let slots: Vec<TimeInterval> =
            generate_slots(&hours, duration, &appointments, &blocks, date).unwrap().collect();

        for slot in &slots {
            prop_assert_eq!(slot.duration_minutes(), duration);
            for busy in appointments.iter().chain(blocks.iter()) {
                prop_assert!(!overlaps(slot, busy), "{:?} overlaps {:?}", slot, busy);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: slots are chronological, inside the window, on the stride grid
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_stay_on_grid_inside_window(
        window in arb_window(),
        duration in arb_duration(),
        blocks in prop::collection::vec(arb_interval(), 0..4),
    ) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        let hours = vec![WorkingHours::new(
            0,
            NaiveTime::from_hms_opt(window.0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(window.1, 0, 0).unwrap(),
            true,
        ).unwrap()];
        let open = base() + Duration::hours(window.0 as i64);
        let close = base() + Duration::hours(window.1 as i64);

        let slots: Vec<TimeInterval> =
            generate_slots(&hours, duration, &[], &blocks, date).unwrap().collect();

        let max_slots = ((close - open).num_minutes() / duration) as usize;
        prop_assert!(slots.len() <= max_slots);
        for slot in &slots {
            prop_assert!(slot.start >= open && slot.end <= close);
            prop_assert_eq!((slot.start - open).num_minutes() % duration, 0);
        }
        for pair in slots.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        if blocks.is_empty() {
            prop_assert_eq!(slots.len(), max_slots);
        }
    }
}
