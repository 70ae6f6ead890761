//! Appointments and their status lifecycle.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::TimeInterval;
use crate::wire;

/// Minimum notice, in hours, for a client to cancel an appointment.
pub const CANCELLATION_NOTICE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Cancelled and completed appointments never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed
        )
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        if *self == next {
            return true;
        }
        match self {
            Pending => matches!(next, Confirmed | Cancelled | Completed),
            Confirmed => matches!(next, Cancelled | Completed),
            Cancelled | Completed => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub professional_id: i64,
    pub client_id: String,
    pub service_id: i64,
    #[serde(with = "wire::datetime")]
    pub date_time: DateTime<Utc>,
    /// Length in minutes.
    pub duration: i64,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    /// # Errors
    /// Returns `EngineError::InvalidDuration` when the stored duration is not positive or
    /// runs past the representable range.
    pub fn end(&self) -> Result<DateTime<Utc>> {
        TimeInterval::from_start(self.date_time, self.duration).map(|interval| interval.end)
    }

    /// The occupied interval, or `None` when the stored duration is not positive.
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::from_start(self.date_time, self.duration).ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// Move to `next`, refusing transitions out of a terminal state.
    pub fn transition(&mut self, next: AppointmentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// A client may cancel a live appointment with at least 24 hours of notice.
    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal()
            && self.date_time - now >= Duration::hours(CANCELLATION_NOTICE_HOURS)
    }
}

/// Occupied intervals of every non-cancelled appointment.
pub fn busy_intervals(appointments: &[Appointment]) -> Vec<TimeInterval> {
    appointments
        .iter()
        .filter(|a| !a.is_cancelled())
        .filter_map(Appointment::interval)
        .collect()
}

/// Payload for booking an appointment as a signed-in client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub professional_id: i64,
    pub service_id: i64,
    #[serde(with = "wire::datetime")]
    pub date_time: DateTime<Utc>,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

/// Contact details collected when a guest books without an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
}

/// Payload for booking an appointment as a guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGuestAppointment {
    #[serde(flatten)]
    pub appointment: NewAppointment,
    #[serde(flatten)]
    pub guest: GuestInfo,
}
