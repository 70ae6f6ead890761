//! Client-side slot computation wired to the booking store.

use std::sync::Arc;

use agenda_engine::appointment::{GuestInfo, NewAppointment, NewGuestAppointment};
use agenda_engine::calendar::day_interval;
use agenda_engine::service::Service;
use agenda_engine::{
    block_intervals, busy_intervals, generate_slots_in, Appointment, AppointmentStatus, DstPolicy,
    TimeInterval,
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::api::ApiClient;
use crate::booking::{BookingAction, BookingState, BookingStore, SlotQuery};
use crate::error::{ClientError, Result};
use crate::session::{KeyValueStore, MemoryStore};

pub struct AvailabilityService<S: KeyValueStore = MemoryStore> {
    client: Arc<ApiClient<S>>,
    store: BookingStore,
    zone: Tz,
    policy: DstPolicy,
}

impl<S: KeyValueStore> AvailabilityService<S> {
    pub fn new(client: Arc<ApiClient<S>>, store: BookingStore, zone: Tz) -> Self {
        Self {
            client,
            store,
            zone,
            policy: DstPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DstPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &BookingStore {
        &self.store
    }

    pub async fn select_service(&self, service: Service) -> BookingState {
        self.store.dispatch(BookingAction::SelectService(service));
        self.refresh().await
    }

    pub async fn select_date(&self, date: NaiveDate) -> BookingState {
        self.store.dispatch(BookingAction::SelectDate(date));
        self.refresh().await
    }

    /// Fetch inputs for the current query, compute its slots and dispatch the outcome.
    ///
    /// The result is tagged with the generation current when the fetch began; if the query
    /// changed meanwhile, the store discards it.
    pub async fn refresh(&self) -> BookingState {
        let state = self.store.state();
        let Some(query) = state.query else {
            return state;
        };
        let Some(duration) = state.service.as_ref().map(|s| s.duration) else {
            return state;
        };
        let generation = state.generation;
        let action = match self.load(query, duration).await {
            Ok(slots) => BookingAction::SlotsLoaded { generation, slots },
            Err(e) => BookingAction::SlotsFailed {
                generation,
                message: e.user_message(),
            },
        };
        self.store.dispatch(action)
    }

    async fn load(&self, query: SlotQuery, duration: i64) -> Result<Vec<TimeInterval>> {
        let day = day_interval(query.date, &self.zone);
        let pid = query.professional_id;
        debug!(?query, "loading availability");

        let (hours, appointments, blocks) = tokio::try_join!(
            self.client.working_hours(pid),
            self.client.appointments_for(pid, day.start, day.end),
            self.client.blocks(pid),
        )?;

        let busy = busy_intervals(&appointments);
        let blocked = block_intervals(&blocks);
        let slots = generate_slots_in(&hours, duration, &busy, &blocked, query.date, self.zone, self.policy)?;
        Ok(slots.collect())
    }

    /// Book the selected slot for the signed-in client, then re-query the day.
    pub async fn book(&self, notes: Option<String>) -> Result<Appointment> {
        let payload = self.selected_payload(notes)?;
        let appointment = self.client.create_appointment(&payload).await?;
        self.store.dispatch(BookingAction::Refresh);
        self.refresh().await;
        Ok(appointment)
    }

    /// Book the selected slot for a guest, then re-query the day.
    pub async fn book_as_guest(&self, guest: GuestInfo, notes: Option<String>) -> Result<Appointment> {
        let payload = NewGuestAppointment {
            appointment: self.selected_payload(notes)?,
            guest,
        };
        let appointment = self.client.create_guest_appointment(&payload).await?;
        self.store.dispatch(BookingAction::Refresh);
        self.refresh().await;
        Ok(appointment)
    }

    fn selected_payload(&self, notes: Option<String>) -> Result<NewAppointment> {
        let state = self.store.state();
        match (state.service, state.selected_slot) {
            (Some(service), Some(slot)) => Ok(NewAppointment {
                professional_id: state.professional_id,
                service_id: service.id,
                date_time: slot.start,
                duration: service.duration,
                notes: notes.filter(|n| !n.trim().is_empty()),
                status: AppointmentStatus::Pending,
            }),
            _ => Err(ClientError::SelectionIncomplete),
        }
    }
}
