//! Summary counts for a professional's dashboard.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, AppointmentStatus};
use crate::calendar::{day_interval, local_midnight};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub today: usize,
    pub pending: usize,
    pub this_week: usize,
    pub this_month: usize,
}

impl DashboardStats {
    /// Count appointments relative to the local day containing `now`.
    ///
    /// Week and month are the 7 and 30 days starting at today's midnight. Cancelled
    /// appointments never count towards the date-based totals.
    pub fn compute(appointments: &[Appointment], now: DateTime<Utc>, zone: &Tz) -> Self {
        let today = now.with_timezone(zone).date_naive();
        let today_range = day_interval(today, zone);
        let midnight = local_midnight(today, zone);
        let week_end = midnight + Duration::days(7);
        let month_end = midnight + Duration::days(30);

        let live = || appointments.iter().filter(|a| !a.is_cancelled());

        Self {
            today: live().filter(|a| today_range.contains(a.date_time)).count(),
            pending: appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Pending)
                .count(),
            this_week: live()
                .filter(|a| a.date_time >= midnight && a.date_time < week_end)
                .count(),
            this_month: live()
                .filter(|a| a.date_time >= midnight && a.date_time < month_end)
                .count(),
        }
    }
}

/// The next `limit` non-cancelled appointments starting at or after `now`.
pub fn upcoming(appointments: &[Appointment], now: DateTime<Utc>, limit: usize) -> Vec<&Appointment> {
    let mut next: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| !a.is_cancelled() && a.date_time >= now)
        .collect();
    next.sort_by_key(|a| a.date_time);
    next.truncate(limit);
    next
}
