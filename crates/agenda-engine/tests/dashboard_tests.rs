//! Tests for dashboard summaries.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use agenda_engine::dashboard::{upcoming, DashboardStats};
use agenda_engine::{Appointment, AppointmentStatus};

fn appt(id: i64, date_time: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
    Appointment {
        id,
        professional_id: 1,
        client_id: format!("client-{id}"),
        service_id: 1,
        date_time,
        duration: 30,
        status,
        notes: None,
    }
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
}

#[test]
fn stats_bucket_by_local_day_and_skip_cancelled() {
    use AppointmentStatus::*;
    let now = day(16, 8);
    let appointments = vec![
        appt(1, day(16, 10), Pending),
        appt(2, day(16, 15), Cancelled),
        appt(3, day(18, 9), Confirmed),
        appt(4, day(25, 9), Pending),
        appt(5, Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap(), Confirmed),
        appt(6, day(10, 9), Completed),
    ];

    let stats = DashboardStats::compute(&appointments, now, &Tz::UTC);

    assert_eq!(
        stats,
        DashboardStats {
            today: 1,
            pending: 2,
            this_week: 2,
            this_month: 4,
        }
    );
}

#[test]
fn today_follows_the_professional_zone() {
    // 01:00 UTC on the 17th is still the 16th in Sao Paulo.
    let zone: Tz = "America/Sao_Paulo".parse().unwrap();
    let now = day(16, 20);
    let appointments = vec![appt(1, day(17, 1), AppointmentStatus::Confirmed)];

    assert_eq!(DashboardStats::compute(&appointments, now, &zone).today, 1);
    assert_eq!(DashboardStats::compute(&appointments, now, &Tz::UTC).today, 0);
}

#[test]
fn upcoming_is_sorted_and_limited() {
    use AppointmentStatus::*;
    let now = day(16, 12);
    let appointments = vec![
        appt(1, day(20, 9), Pending),
        appt(2, day(16, 9), Confirmed),
        appt(3, day(17, 9), Cancelled),
        appt(4, day(18, 9), Confirmed),
        appt(5, day(16, 12), Pending),
    ];

    let next: Vec<i64> = upcoming(&appointments, now, 2).iter().map(|a| a.id).collect();
    assert_eq!(next, vec![5, 4]);
}
