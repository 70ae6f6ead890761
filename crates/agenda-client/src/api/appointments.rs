use agenda_engine::appointment::{NewAppointment, NewGuestAppointment};
use agenda_engine::{Appointment, AppointmentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiClient;
use crate::error::Result;
use crate::session::KeyValueStore;

/// Server-computed availability for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    /// Local `HH:MM` starts.
    pub slots: Vec<String>,
}

impl<S: KeyValueStore> ApiClient<S> {
    /// Non-cancelled appointments of a professional starting in `[from, to)`.
    ///
    /// The window and status are also enforced locally.
    pub async fn appointments_for(
        &self,
        professional_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let query = [
            ("professional_id", professional_id.to_string()),
            ("date_from", from.to_rfc3339()),
            ("date_to", to.to_rfc3339()),
        ];
        let appointments: Vec<Appointment> = self.get_json("appointments/", &query).await?;
        Ok(appointments
            .into_iter()
            .filter(|a| {
                a.professional_id == professional_id
                    && !a.is_cancelled()
                    && a.date_time < to
                    && a.end().is_ok_and(|end| end > from)
            })
            .collect())
    }

    pub async fn my_appointments(&self) -> Result<Vec<Appointment>> {
        self.require_token()?;
        self.get_json("appointments/my-appointments", &[]).await
    }

    pub async fn available_slots(
        &self,
        professional_id: i64,
        date: NaiveDate,
        service_id: i64,
    ) -> Result<AvailableSlots> {
        let query = [
            ("professional_id", professional_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
            ("service_id", service_id.to_string()),
        ];
        self.get_json("appointments/available-slots", &query).await
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Appointment> {
        self.send_json(Method::POST, "appointments/", appointment).await
    }

    pub async fn create_guest_appointment(&self, appointment: &NewGuestAppointment) -> Result<Appointment> {
        self.send_json(Method::POST, "guest-appointments/", appointment).await
    }

    pub async fn update_status(&self, id: i64, status: AppointmentStatus) -> Result<Appointment> {
        self.send_json(Method::PUT, &format!("appointments/{}", id), &json!({ "status": status }))
            .await
    }

    pub async fn cancel_appointment(&self, id: i64) -> Result<()> {
        self.delete(&format!("appointments/{}", id)).await
    }
}
