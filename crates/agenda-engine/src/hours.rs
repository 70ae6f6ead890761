//! Per-weekday working hours.
//!
//! Weekdays are numbered `0 = Monday` through `6 = Sunday`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::wire;

pub const DAYS_PER_WEEK: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<i64>,
    pub day: u8,
    #[serde(with = "wire::time")]
    pub start_time: NaiveTime,
    #[serde(with = "wire::time")]
    pub end_time: NaiveTime,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl WorkingHours {
    pub fn new(day: u8, start_time: NaiveTime, end_time: NaiveTime, active: bool) -> Result<Self> {
        if day >= DAYS_PER_WEEK {
            return Err(EngineError::InvalidWeekday(day));
        }
        Ok(Self {
            id: None,
            professional_id: None,
            day,
            start_time,
            end_time,
            active,
        })
    }

    /// Whether bookings can happen under this record at all.
    pub fn is_open(&self) -> bool {
        self.active && self.start_time < self.end_time
    }
}

/// Weekday index of `date` (`0 = Monday`).
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// The active record for the weekday of `date`, if one exists.
pub fn hours_for_date(hours: &[WorkingHours], date: NaiveDate) -> Option<&WorkingHours> {
    let day = weekday_index(date);
    hours.iter().find(|h| h.day == day && h.active)
}

/// A professional's week: at most one record per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Option<WorkingHours>; DAYS_PER_WEEK as usize],
}

impl WeeklySchedule {
    /// Build a schedule, rejecting out-of-range weekdays and duplicates.
    pub fn from_records(records: impl IntoIterator<Item = WorkingHours>) -> Result<Self> {
        let mut schedule = Self::default();
        for record in records {
            if record.day >= DAYS_PER_WEEK {
                return Err(EngineError::InvalidWeekday(record.day));
            }
            let slot = &mut schedule.days[record.day as usize];
            if slot.is_some() {
                return Err(EngineError::DuplicateWeekday(record.day));
            }
            *slot = Some(record);
        }
        Ok(schedule)
    }

    /// Seven active days from 09:00 to 18:00, the starting point of the settings form.
    pub fn default_week() -> Self {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN);
        let mut schedule = Self::default();
        for day in 0..DAYS_PER_WEEK {
            schedule.days[day as usize] = Some(WorkingHours {
                id: None,
                professional_id: None,
                day,
                start_time: start,
                end_time: end,
                active: true,
            });
        }
        schedule
    }

    pub fn get(&self, day: u8) -> Option<&WorkingHours> {
        self.days.get(day as usize).and_then(Option::as_ref)
    }

    /// Replace the record for its weekday.
    pub fn set(&mut self, record: WorkingHours) -> Result<()> {
        let slot = self
            .days
            .get_mut(record.day as usize)
            .ok_or(EngineError::InvalidWeekday(record.day))?;
        *slot = Some(record);
        Ok(())
    }

    /// Overlay persisted records on top of this schedule, weekday by weekday.
    pub fn merge_records(&mut self, records: impl IntoIterator<Item = WorkingHours>) {
        for record in records {
            if let Some(slot) = self.days.get_mut(record.day as usize) {
                *slot = Some(record);
            }
        }
    }

    pub fn for_date(&self, date: NaiveDate) -> Option<&WorkingHours> {
        self.get(weekday_index(date)).filter(|h| h.active)
    }

    /// Records in weekday order, ready to be saved as a batch.
    pub fn records(&self) -> Vec<WorkingHours> {
        self.days.iter().flatten().cloned().collect()
    }
}
