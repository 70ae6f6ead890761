//! # agenda-engine
//!
//! Deterministic availability evaluation for appointment booking.
//!
//! The engine answers the questions a booking front end asks before it talks to the
//! backend: which slots of a day can still be booked, whether two time ranges clash,
//! and which calendar days carry blocks. Every function is pure and synchronous; the
//! caller fetches working hours, appointments and blocks first and passes them in.
//!
//! ## Modules
//!
//! - [`interval`] — half-open `TimeInterval` and the overlap predicate
//! - [`conflict`] — pairwise conflict detection between interval lists
//! - [`calendar`] — block-day classification for month views
//! - [`slots`] — bookable slot generation from working hours
//! - [`dst`] — DST policies for wall-clock working hours
//! - [`appointment`], [`block`], [`hours`], [`service`], [`account`] — wire model
//! - [`validation`] — typed validation of form drafts
//! - [`dashboard`] — summary counts for a professional's agenda
//! - [`wire`] — lenient decoding of backend datetimes, times and prices
//! - [`error`] — Error types

pub mod account;
pub mod appointment;
pub mod block;
pub mod calendar;
pub mod conflict;
pub mod dashboard;
pub mod dst;
pub mod error;
pub mod hours;
pub mod interval;
pub mod service;
pub mod slots;
pub mod validation;
pub mod wire;

pub use appointment::{busy_intervals, Appointment, AppointmentStatus};
pub use block::{block_intervals, Block};
pub use calendar::{classify_day, is_day_blocked, is_day_blocked_in, DayBlockState};
pub use conflict::{find_conflicts, Conflict};
pub use dst::DstPolicy;
pub use error::EngineError;
pub use hours::{WeeklySchedule, WorkingHours};
pub use interval::{overlaps, TimeInterval};
pub use slots::{generate_slots, generate_slots_in, Slots};
