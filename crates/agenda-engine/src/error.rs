//! Error types for agenda-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::appointment::AppointmentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid weekday: {0} (expected 0 = Monday through 6 = Sunday)")]
    InvalidWeekday(u8),

    #[error("Duplicate working hours for weekday {0}")]
    DuplicateWeekday(u8),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Invalid datetime '{0}'")]
    InvalidDateTime(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
