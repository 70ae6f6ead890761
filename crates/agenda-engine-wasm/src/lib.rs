//! WASM bindings for agenda-engine.
//!
//! Exposes slot generation, conflict detection and block-day classification to the
//! browser booking client via `wasm-bindgen`. All complex types are passed as JSON
//! strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p agenda-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/pkg/ \
//!   target/wasm32-unknown-unknown/release/agenda_engine_wasm.wasm
//! ```

use agenda_engine::calendar::blocked_days;
use agenda_engine::slots::format_slot_start;
use agenda_engine::wire::parse_datetime;
use agenda_engine::{DayBlockState, DstPolicy, TimeInterval, WorkingHours};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for intervals passed from JavaScript.
#[derive(Deserialize)]
struct IntervalInput {
    start: String,
    end: String,
}

#[derive(Serialize)]
struct IntervalDto {
    start: String,
    end: String,
}

impl From<&TimeInterval> for IntervalDto {
    fn from(iv: &TimeInterval) -> Self {
        Self {
            start: iv.start.to_rfc3339(),
            end: iv.end.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
    /// Local `HH:MM` label.
    label: String,
}

#[derive(Serialize)]
struct ConflictDto {
    a: IntervalDto,
    b: IntervalDto,
    overlap_minutes: i64,
}

#[derive(Serialize)]
struct BlockedDayDto {
    date: String,
    state: DayBlockState,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_intervals(json: &str) -> Result<Vec<TimeInterval>, String> {
    let inputs: Vec<IntervalInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid intervals JSON: {}", e))?;

    inputs
        .into_iter()
        .map(|input| {
            let start = parse_datetime(&input.start).map_err(|e| e.to_string())?;
            let end = parse_datetime(&input.end).map_err(|e| e.to_string())?;
            TimeInterval::new(start, end).map_err(|e| e.to_string())
        })
        .collect()
}

fn parse_interval(json: &str) -> Result<TimeInterval, String> {
    let input: IntervalInput =
        serde_json::from_str(json).map_err(|e| format!("Invalid interval JSON: {}", e))?;
    let start = parse_datetime(&input.start).map_err(|e| e.to_string())?;
    let end = parse_datetime(&input.end).map_err(|e| e.to_string())?;
    TimeInterval::new(start, end).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_zone(timezone: Option<&str>) -> Result<Tz, String> {
    match timezone {
        None | Some("") => Ok(Tz::UTC),
        Some(name) => name
            .parse()
            .map_err(|_| format!("Invalid timezone: {}", name)),
    }
}

fn parse_policy(policy: Option<&str>) -> Result<DstPolicy, String> {
    match policy {
        None | Some("") | Some("earliest") => Ok(DstPolicy::Earliest),
        Some("skip") => Ok(DstPolicy::Skip),
        Some("shift_forward") => Ok(DstPolicy::ShiftForward),
        Some(other) => Err(format!(
            "Invalid DST policy '{}': expected skip, shift_forward or earliest",
            other
        )),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Plain implementations (native-testable)
// ---------------------------------------------------------------------------

fn slots_json(
    hours_json: &str,
    duration_minutes: i64,
    appointments_json: &str,
    blocks_json: &str,
    date: &str,
    timezone: Option<&str>,
    dst_policy: Option<&str>,
) -> Result<String, String> {
    let hours: Vec<WorkingHours> =
        serde_json::from_str(hours_json).map_err(|e| format!("Invalid working hours JSON: {}", e))?;
    let appointments = parse_intervals(appointments_json)?;
    let blocks = parse_intervals(blocks_json)?;
    let date = parse_date(date)?;
    let zone = parse_zone(timezone)?;
    let policy = parse_policy(dst_policy)?;

    let slots = agenda_engine::generate_slots_in(
        &hours,
        duration_minutes,
        &appointments,
        &blocks,
        date,
        zone,
        policy,
    )
    .map_err(|e| e.to_string())?;

    let dtos: Vec<SlotDto> = slots
        .map(|s| SlotDto {
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
            label: format_slot_start(&s, &zone),
        })
        .collect();
    to_json(&dtos)
}

fn conflicts_json(a_json: &str, b_json: &str) -> Result<String, String> {
    let a = parse_intervals(a_json)?;
    let b = parse_intervals(b_json)?;

    let dtos: Vec<ConflictDto> = agenda_engine::find_conflicts(&a, &b)
        .iter()
        .map(|c| ConflictDto {
            a: IntervalDto::from(&c.a),
            b: IntervalDto::from(&c.b),
            overlap_minutes: c.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}

fn day_blocked(day: &str, blocks_json: &str, timezone: Option<&str>) -> Result<bool, String> {
    let day = parse_date(day)?;
    let blocks = parse_intervals(blocks_json)?;
    let zone = parse_zone(timezone)?;
    Ok(agenda_engine::is_day_blocked_in(day, &zone, &blocks))
}

fn blocked_days_json(
    year: i32,
    month: u32,
    blocks_json: &str,
    timezone: Option<&str>,
) -> Result<String, String> {
    let blocks = parse_intervals(blocks_json)?;
    let zone = parse_zone(timezone)?;

    let dtos: Vec<BlockedDayDto> = blocked_days(year, month, &zone, &blocks)
        .into_iter()
        .map(|(date, state)| BlockedDayDto {
            date: date.format("%Y-%m-%d").to_string(),
            state,
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether two `{start, end}` intervals overlap (touching endpoints do not).
#[wasm_bindgen(js_name = "overlaps")]
pub fn overlaps(a_json: &str, b_json: &str) -> Result<bool, JsValue> {
    let a = parse_interval(a_json).map_err(|e| JsValue::from_str(&e))?;
    let b = parse_interval(b_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(agenda_engine::overlaps(&a, &b))
}

/// Generate the bookable slots of a date.
///
/// - `hours_json` -- JSON array of working-hours records (`day`, `start_time`, `end_time`, `active`)
/// - `duration_minutes` -- service length; must be positive
/// - `appointments_json`, `blocks_json` -- JSON arrays of `{start, end}` (cancelled appointments already removed)
/// - `date` -- `YYYY-MM-DD`
/// - `timezone` -- IANA zone the working hours are expressed in (default UTC)
/// - `dst_policy` -- `skip`, `shift_forward` or `earliest` (default)
///
/// Returns a JSON array of `{start, end, label}`.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    hours_json: &str,
    duration_minutes: i32,
    appointments_json: &str,
    blocks_json: &str,
    date: &str,
    timezone: Option<String>,
    dst_policy: Option<String>,
) -> Result<String, JsValue> {
    slots_json(
        hours_json,
        duration_minutes as i64,
        appointments_json,
        blocks_json,
        date,
        timezone.as_deref(),
        dst_policy.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Find all pairwise conflicts between two JSON arrays of `{start, end}`.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(a_json: &str, b_json: &str) -> Result<String, JsValue> {
    conflicts_json(a_json, b_json).map_err(|e| JsValue::from_str(&e))
}

/// Whether any block touches the given `YYYY-MM-DD` day in `timezone`.
#[wasm_bindgen(js_name = "isDayBlocked")]
pub fn is_day_blocked(day: &str, blocks_json: &str, timezone: Option<String>) -> Result<bool, JsValue> {
    day_blocked(day, blocks_json, timezone.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Blocked days of a month as a JSON array of `{date, state}` (`partial` or `full`).
#[wasm_bindgen(js_name = "blockedDays")]
pub fn blocked_days_of_month(
    year: i32,
    month: u32,
    blocks_json: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    blocked_days_json(year, month, blocks_json, timezone.as_deref()).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURS: &str = r#"[{"day": 0, "start_time": "09:00", "end_time": "12:00", "active": true}]"#;

    #[test]
    fn slots_carry_local_labels() {
        let json = slots_json(
            HOURS,
            60,
            r#"[{"start": "2026-03-16T13:00:00Z", "end": "2026-03-16T14:00:00Z"}]"#,
            "[]",
            "2026-03-16",
            Some("America/Sao_Paulo"),
            None,
        )
        .unwrap();
        let slots: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        let labels: Vec<&str> = slots.iter().map(|s| s["label"].as_str().unwrap()).collect();
        assert_eq!(labels, vec!["09:00", "11:00"]);
    }

    #[test]
    fn zero_duration_is_an_error() {
        let err = slots_json(HOURS, 0, "[]", "[]", "2026-03-16", None, None).unwrap_err();
        assert!(err.contains("Invalid duration"), "{err}");
    }

    #[test]
    fn unknown_policy_is_an_error() {
        assert!(parse_policy(Some("sideways")).is_err());
        assert_eq!(parse_policy(Some("skip")), Ok(DstPolicy::Skip));
    }

    #[test]
    fn day_blocked_uses_zone() {
        let blocks = r#"[{"start": "2026-03-16T01:00:00Z", "end": "2026-03-16T02:00:00Z"}]"#;
        assert_eq!(day_blocked("2026-03-16", blocks, None), Ok(true));
        assert_eq!(day_blocked("2026-03-16", blocks, Some("America/Sao_Paulo")), Ok(false));
    }

    #[test]
    fn conflicts_report_overlap_minutes() {
        let a = r#"[{"start": "2026-03-16T09:00:00Z", "end": "2026-03-16T10:00:00Z"}]"#;
        let b = r#"[{"start": "2026-03-16T09:45:00Z", "end": "2026-03-16T11:00:00Z"}]"#;
        let json = conflicts_json(a, b).unwrap();
        let conflicts: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(conflicts[0]["overlap_minutes"], 15);
    }

    #[test]
    fn month_view_serializes_states() {
        let blocks = r#"[{"start": "2026-03-20T00:00:00Z", "end": "2026-03-21T00:00:00Z"}]"#;
        let json = blocked_days_json(2026, 3, blocks, None).unwrap();
        assert_eq!(json, r#"[{"date":"2026-03-20","state":"full"}]"#);
    }
}
