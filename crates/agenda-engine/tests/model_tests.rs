//! Tests for the wire model: status lifecycle and backend JSON decoding.

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use agenda_engine::account::{User, UserType};
use agenda_engine::hours::WeeklySchedule;
use agenda_engine::service::Service;
use agenda_engine::{busy_intervals, Appointment, AppointmentStatus, Block, EngineError, WorkingHours};

fn appointment(status: AppointmentStatus) -> Appointment {
    Appointment {
        id: 7,
        professional_id: 1,
        client_id: "2b1f6c1e-0000-4000-8000-000000000000".to_string(),
        service_id: 3,
        date_time: Utc.with_ymd_and_hms(2026, 3, 20, 14, 0, 0).unwrap(),
        duration: 45,
        status,
        notes: None,
    }
}

// ── Status lifecycle ────────────────────────────────────────────────────────

#[test]
fn pending_can_move_forward() {
    use AppointmentStatus::*;
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Pending.can_transition_to(Completed));
    assert!(Confirmed.can_transition_to(Completed));
    assert!(Confirmed.can_transition_to(Cancelled));
}

#[test]
fn terminal_states_never_resurrect() {
    use AppointmentStatus::*;
    for terminal in [Cancelled, Completed] {
        for next in [Pending, Confirmed, Cancelled, Completed] {
            if next != terminal {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }
    assert!(!Confirmed.can_transition_to(Pending));
}

#[test]
fn transition_reports_the_rejected_move() {
    let mut appt = appointment(AppointmentStatus::Cancelled);
    let err = appt.transition(AppointmentStatus::Confirmed).unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Confirmed,
        }
    );
    assert_eq!(appt.status, AppointmentStatus::Cancelled);

    let mut appt = appointment(AppointmentStatus::Pending);
    appt.transition(AppointmentStatus::Confirmed).unwrap();
    assert_eq!(appt.status, AppointmentStatus::Confirmed);
}

#[test]
fn cancellation_needs_a_day_of_notice() {
    let appt = appointment(AppointmentStatus::Confirmed);
    assert!(appt.can_cancel(appt.date_time - Duration::hours(24)));
    assert!(!appt.can_cancel(appt.date_time - Duration::hours(23)));
    assert!(!appointment(AppointmentStatus::Completed).can_cancel(appt.date_time - Duration::days(3)));
}

#[test]
fn appointment_interval_uses_duration() {
    let appt = appointment(AppointmentStatus::Pending);
    let interval = appt.interval().unwrap();
    assert_eq!(interval.duration_minutes(), 45);
    assert_eq!(interval.end, appt.end().unwrap());

    let broken = Appointment { duration: 0, ..appt };
    assert!(broken.interval().is_none());
    assert_eq!(broken.end(), Err(EngineError::InvalidDuration(0)));
}

#[test]
fn unrepresentable_duration_is_not_busy_time() {
    let appt = Appointment {
        duration: 10_000_000_000_000,
        ..appointment(AppointmentStatus::Confirmed)
    };
    assert!(appt.interval().is_none());
    assert_eq!(appt.end(), Err(EngineError::InvalidDuration(10_000_000_000_000)));
    assert!(busy_intervals(&[appt]).is_empty());
}

// ── Backend JSON ────────────────────────────────────────────────────────────

#[test]
fn appointment_decodes_naive_backend_datetime() {
    let json = r#"{
        "id": 7, "professional_id": 1, "client_id": "abc", "service_id": 3,
        "date_time": "2026-03-20T14:00:00", "duration": 45, "status": "confirmed",
        "notes": null, "created_at": "2026-03-01T10:00:00", "updated_at": "2026-03-01T10:00:00"
    }"#;
    let appt: Appointment = serde_json::from_str(json).unwrap();
    assert_eq!(appt.status, AppointmentStatus::Confirmed);
    assert_eq!(appt.date_time, Utc.with_ymd_and_hms(2026, 3, 20, 14, 0, 0).unwrap());
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&AppointmentStatus::Cancelled).unwrap(),
        "\"cancelled\""
    );
}

#[test]
fn block_decodes_and_rejects_inverted_interval() {
    let json = r#"{"id": 1, "professional_id": 2, "start_time": "2026-03-16T12:00:00Z",
                   "end_time": "2026-03-16T10:00:00Z", "reason": "Dentist"}"#;
    let block: Block = serde_json::from_str(json).unwrap();
    assert_eq!(block.reason.as_deref(), Some("Dentist"));
    assert!(block.interval().is_none());
}

#[test]
fn service_price_accepts_decimal_strings() {
    let json = r#"{"id": 1, "professional_id": 2, "name": "Haircut", "duration": 30,
                   "price": "45.50", "active": true}"#;
    let service: Service = serde_json::from_str(json).unwrap();
    assert_eq!(service.price, 45.5);
}

#[test]
fn working_hours_accept_short_and_long_times() {
    let json = r#"[{"day": 0, "start_time": "09:00", "end_time": "18:00:00", "active": true}]"#;
    let hours: Vec<WorkingHours> = serde_json::from_str(json).unwrap();
    assert_eq!(hours[0].start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(hours[0].end_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
}

#[test]
fn user_type_is_read_from_type_field() {
    let json = r#"{"id": "u1", "email": "ana@example.com", "name": "Ana", "type": "professional",
                   "active": true, "professional": {"id": 4}}"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.user_type, UserType::Professional);
    assert_eq!(user.professional_id(), Some(4));
}

// ── Weekly schedule ─────────────────────────────────────────────────────────

#[test]
fn weekly_schedule_rejects_duplicate_days() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
    let records = vec![
        WorkingHours::new(2, nine, five, true).unwrap(),
        WorkingHours::new(2, nine, five, false).unwrap(),
    ];
    assert_eq!(
        WeeklySchedule::from_records(records),
        Err(EngineError::DuplicateWeekday(2))
    );
}

#[test]
fn weekday_out_of_range_is_rejected() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    assert_eq!(
        WorkingHours::new(7, nine, nine, true),
        Err(EngineError::InvalidWeekday(7))
    );
}

#[test]
fn default_week_is_overlaid_by_saved_records() {
    let mut week = WeeklySchedule::default_week();
    assert_eq!(week.records().len(), 7);

    let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    let two = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
    week.merge_records(vec![WorkingHours::new(6, ten, two, false).unwrap()]);

    let sunday = week.get(6).unwrap();
    assert!(!sunday.active);
    assert_eq!(sunday.start_time, ten);
    // 2026-03-22 is a Sunday; inactive days have no hours.
    let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 22).unwrap();
    assert!(week.for_date(date).is_none());
}
