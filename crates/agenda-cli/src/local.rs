//! Offline evaluation of a JSON day document.

use agenda_engine::calendar::{blocked_days, classify_day};
use agenda_engine::slots::format_slot_start;
use agenda_engine::{
    block_intervals, busy_intervals, find_conflicts, generate_slots_in, is_day_blocked_in, Appointment,
    Block, Conflict, DstPolicy, TimeInterval, WorkingHours,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Format;

/// Backend records for one professional, as the API returns them.
#[derive(Debug, Default, Deserialize)]
pub struct DayDocument {
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

pub fn read_day(content: &str) -> Result<DayDocument> {
    serde_json::from_str(content).context("Failed to parse day document")
}

#[derive(Serialize)]
struct SlotOut {
    start: String,
    end: String,
    label: String,
}

pub fn render_slots(slots: &[TimeInterval], zone: &Tz, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(slots
            .iter()
            .map(|s| {
                format!(
                    "{}-{}\n",
                    format_slot_start(s, zone),
                    s.end.with_timezone(zone).format("%H:%M")
                )
            })
            .collect()),
        Format::Json => {
            let out: Vec<SlotOut> = slots
                .iter()
                .map(|s| SlotOut {
                    start: s.start.to_rfc3339(),
                    end: s.end.to_rfc3339(),
                    label: format_slot_start(s, zone),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&out)?)
        }
    }
}

pub fn slots(
    doc: &DayDocument,
    date: NaiveDate,
    duration: i64,
    zone: Tz,
    policy: DstPolicy,
    format: Format,
) -> Result<String> {
    let busy = busy_intervals(&doc.appointments);
    let blocked = block_intervals(&doc.blocks);
    let slots: Vec<TimeInterval> =
        generate_slots_in(&doc.working_hours, duration, &busy, &blocked, date, zone, policy)
            .context("Failed to generate slots")?
            .collect();
    render_slots(&slots, &zone, format)
}

pub fn day_blocked(doc: &DayDocument, date: NaiveDate, zone: Tz) -> Result<String> {
    let blocked = block_intervals(&doc.blocks);
    let out = json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "blocked": is_day_blocked_in(date, &zone, &blocked),
        "state": classify_day(date, &zone, &blocked),
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn month(doc: &DayDocument, year: i32, month: u32, zone: Tz) -> Result<String> {
    if !(1..=12).contains(&month) {
        anyhow::bail!("Invalid month: {} (expected 1-12)", month);
    }
    let blocked = block_intervals(&doc.blocks);
    let out: Vec<_> = blocked_days(year, month, &zone, &blocked)
        .into_iter()
        .map(|(date, state)| json!({ "date": date.format("%Y-%m-%d").to_string(), "state": state }))
        .collect();
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn conflicts(doc: &DayDocument) -> Result<String> {
    let busy = busy_intervals(&doc.appointments);
    let blocked = block_intervals(&doc.blocks);

    let mut double_bookings: Vec<Conflict> = Vec::new();
    for (i, appointment) in busy.iter().enumerate() {
        double_bookings.extend(find_conflicts(std::slice::from_ref(appointment), &busy[i + 1..]));
    }

    let out = json!({
        "block_conflicts": find_conflicts(&busy, &blocked),
        "double_bookings": double_bookings,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}
