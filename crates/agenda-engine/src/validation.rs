//! Field-by-field validation of raw form input.
//!
//! Each draft holds the strings a user typed. `validate` either produces the typed
//! payload the backend expects or a [`ValidationErrors`] map listing every failing
//! rule per field, so a front end can annotate all fields at once.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use validator::ValidateEmail;

use crate::account::{Credentials, NewUser, UserType};
use crate::appointment::GuestInfo;
use crate::block::NewBlock;
use crate::dst::{resolve_local, DstPolicy};
use crate::hours::{WorkingHours, DAYS_PER_WEEK};
use crate::service::NewService;
use crate::wire::parse_time;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_SERVICE_MINUTES: i64 = 15;
pub const MIN_SERVICE_PRICE: f64 = 0.01;

/// A single failed rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("is required")]
    Required,
    #[error("is not a valid email address")]
    InvalidEmail,
    #[error("must be at least {0} characters")]
    TooShort(usize),
    #[error("must be at least {0}")]
    BelowMinimum(String),
    #[error("is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate,
    #[error("is not a valid time (expected HH:MM)")]
    InvalidTime,
    #[error("must be after the start")]
    EndBeforeStart,
    #[error("cannot be in the past")]
    InPast,
    #[error("must be between 0 and 6")]
    InvalidWeekday,
}

/// Failed rules keyed by field name, in field-name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<FieldError>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, error: FieldError) {
        self.fields.entry(field).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> &[FieldError] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str, error: &FieldError) -> bool {
        self.get(field).contains(error)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &[FieldError])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.fields {
            for error in errors {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, error)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn required<'a>(errors: &mut ValidationErrors, field: &'static str, value: &'a str) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, FieldError::Required);
        None
    } else {
        Some(trimmed)
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Email syntax as the `validator` crate checks it, plus a dotted domain: the backend
/// rejects bare hosts such as `ana@localhost`.
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

fn email(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<String> {
    let value = required(errors, field, value)?;
    if !is_valid_email(value) {
        errors.add(field, FieldError::InvalidEmail);
        return None;
    }
    Some(value.to_string())
}

fn date(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<NaiveDate> {
    let value = required(errors, field, value)?;
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    if parsed.is_none() {
        errors.add(field, FieldError::InvalidDate);
    }
    parsed
}

fn time(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<NaiveTime> {
    let value = required(errors, field, value)?;
    let parsed = parse_time(value);
    if parsed.is_none() {
        errors.add(field, FieldError::InvalidTime);
    }
    parsed
}

/// Block form: a start and end date/time in the professional's zone plus a reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDraft {
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub reason: String,
}

impl BlockDraft {
    pub fn validate(
        &self,
        professional_id: i64,
        zone: &Tz,
        now: DateTime<Utc>,
    ) -> Result<NewBlock, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let start_date = date(&mut errors, "start_date", &self.start_date);
        let start_time = time(&mut errors, "start_time", &self.start_time);
        let end_date = date(&mut errors, "end_date", &self.end_date);
        let end_time = time(&mut errors, "end_time", &self.end_time);

        let (Some(sd), Some(st), Some(ed), Some(et)) = (start_date, start_time, end_date, end_time)
        else {
            return Err(errors);
        };

        let resolve = |d: NaiveDate, t: NaiveTime| {
            let naive = d.and_time(t);
            resolve_local(naive, zone, DstPolicy::ShiftForward).unwrap_or_else(|| naive.and_utc())
        };
        let start = resolve(sd, st);
        let end = resolve(ed, et);

        if start >= end {
            errors.add("end_time", FieldError::EndBeforeStart);
        }
        if start < now {
            errors.add("start_time", FieldError::InPast);
        }

        errors.into_result(|| NewBlock {
            professional_id,
            start_time: start,
            end_time: end,
            reason: optional(&self.reason),
        })
    }
}

/// Service dialog input.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub description: String,
    pub duration: Option<i64>,
    pub price: Option<f64>,
    pub active: bool,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            duration: Some(30),
            price: Some(0.0),
            active: true,
        }
    }
}

impl ServiceDraft {
    pub fn validate(&self, professional_id: Option<i64>) -> Result<NewService, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(&mut errors, "name", &self.name).map(str::to_string);

        let duration = match self.duration {
            None => {
                errors.add("duration", FieldError::Required);
                None
            }
            Some(d) if d < MIN_SERVICE_MINUTES => {
                errors.add("duration", FieldError::BelowMinimum(MIN_SERVICE_MINUTES.to_string()));
                None
            }
            Some(d) => Some(d),
        };

        let price = match self.price {
            None => {
                errors.add("price", FieldError::Required);
                None
            }
            Some(p) if !p.is_finite() || p < MIN_SERVICE_PRICE => {
                errors.add("price", FieldError::BelowMinimum(MIN_SERVICE_PRICE.to_string()));
                None
            }
            Some(p) => Some(p),
        };

        match (name, duration, price) {
            (Some(name), Some(duration), Some(price)) if errors.is_empty() => Ok(NewService {
                professional_id,
                name,
                description: optional(&self.description),
                duration,
                price,
                active: self.active,
            }),
            _ => Err(errors),
        }
    }
}

/// Sign-up form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub user_type: UserType,
}

impl RegistrationDraft {
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(&mut errors, "name", &self.name).map(str::to_string);
        let email = email(&mut errors, "email", &self.email);
        let password = match required(&mut errors, "password", &self.password) {
            Some(_) if self.password.chars().count() < MIN_PASSWORD_LEN => {
                errors.add("password", FieldError::TooShort(MIN_PASSWORD_LEN));
                None
            }
            Some(_) => Some(self.password.clone()),
            None => None,
        };

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(NewUser {
                email,
                password,
                name,
                phone: optional(&self.phone),
                user_type: self.user_type,
            }),
            _ => Err(errors),
        }
    }
}

/// Login form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginDraft {
    pub email: String,
    pub password: String,
}

impl LoginDraft {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = email(&mut errors, "email", &self.email);
        let password = required(&mut errors, "password", &self.password).map(|_| self.password.clone());

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(errors),
        }
    }
}

/// Contact details a guest enters before booking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl GuestDraft {
    pub fn validate(&self) -> Result<GuestInfo, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = required(&mut errors, "client_name", &self.name).map(str::to_string);
        let email = email(&mut errors, "client_email", &self.email);
        let phone = required(&mut errors, "client_phone", &self.phone).map(str::to_string);

        match (name, email, phone) {
            (Some(client_name), Some(client_email), Some(client_phone)) => Ok(GuestInfo {
                client_name,
                client_email,
                client_phone,
            }),
            _ => Err(errors),
        }
    }
}

/// One row of the weekly hours form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingHoursDraft {
    pub day: u8,
    pub start: String,
    pub end: String,
    pub active: bool,
}

impl WorkingHoursDraft {
    pub fn validate(&self, professional_id: Option<i64>) -> Result<WorkingHours, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.day >= DAYS_PER_WEEK {
            errors.add("day", FieldError::InvalidWeekday);
        }
        let start = time(&mut errors, "start", &self.start);
        let end = time(&mut errors, "end", &self.end);

        if let (Some(s), Some(e)) = (start, end) {
            if self.active && s >= e {
                errors.add("end", FieldError::EndBeforeStart);
            }
        }

        match (start, end) {
            (Some(start_time), Some(end_time)) if errors.is_empty() => Ok(WorkingHours {
                id: None,
                professional_id,
                day: self.day,
                start_time,
                end_time,
                active: self.active,
            }),
            _ => Err(errors),
        }
    }
}
