//! Booking flow state.
//!
//! Actions go through [`reduce`] to produce the next [`BookingState`], which the
//! [`BookingStore`] publishes on a `tokio::sync::watch` channel. Slot results are tagged
//! with the generation of the query they answer; results for any other generation are
//! discarded, so a slow response for a previous date or service can never overwrite the
//! current one.

use agenda_engine::service::Service;
use agenda_engine::TimeInterval;
use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Identity of one slot lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotQuery {
    pub professional_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingState {
    pub professional_id: i64,
    pub service: Option<Service>,
    pub date: Option<NaiveDate>,
    pub query: Option<SlotQuery>,
    /// Incremented every time the query changes or is re-issued.
    pub generation: u64,
    pub slots: Vec<TimeInterval>,
    pub loading: bool,
    pub selected_slot: Option<TimeInterval>,
    pub error: Option<String>,
}

impl BookingState {
    pub fn new(professional_id: i64) -> Self {
        Self {
            professional_id,
            ..Self::default()
        }
    }

    /// Whether a result tagged `generation` answers the current query.
    pub fn is_current(&self, generation: u64) -> bool {
        self.query.is_some() && generation == self.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SelectService(Service),
    SelectDate(NaiveDate),
    /// Re-issue the current query, e.g. after a booking took one of its slots.
    Refresh,
    SlotsLoaded { generation: u64, slots: Vec<TimeInterval> },
    SlotsFailed { generation: u64, message: String },
    SelectSlot(TimeInterval),
    Reset,
}

pub fn reduce(state: &BookingState, action: BookingAction) -> BookingState {
    let mut next = state.clone();
    match action {
        BookingAction::SelectService(service) => {
            next.service = Some(service);
            open_query(&mut next);
        }
        BookingAction::SelectDate(date) => {
            next.date = Some(date);
            open_query(&mut next);
        }
        BookingAction::Refresh => {
            if next.query.is_some() {
                open_query(&mut next);
            }
        }
        BookingAction::SlotsLoaded { generation, slots } => {
            if !state.is_current(generation) {
                warn!(generation, current = state.generation, "discarding stale slots");
                return next;
            }
            next.slots = slots;
            next.loading = false;
            next.error = None;
        }
        BookingAction::SlotsFailed { generation, message } => {
            if !state.is_current(generation) {
                warn!(generation, current = state.generation, "discarding stale slot failure");
                return next;
            }
            next.slots.clear();
            next.loading = false;
            next.error = Some(message);
        }
        BookingAction::SelectSlot(slot) => {
            if next.slots.contains(&slot) {
                next.selected_slot = Some(slot);
            }
        }
        BookingAction::Reset => next = BookingState::new(state.professional_id),
    }
    next
}

fn open_query(state: &mut BookingState) {
    state.slots.clear();
    state.selected_slot = None;
    state.error = None;
    state.generation += 1;
    state.query = match (&state.service, state.date) {
        (Some(service), Some(date)) => Some(SlotQuery {
            professional_id: state.professional_id,
            service_id: service.id,
            date,
        }),
        _ => None,
    };
    state.loading = state.query.is_some();
}

#[derive(Debug)]
pub struct BookingStore {
    tx: watch::Sender<BookingState>,
}

impl BookingStore {
    pub fn new(professional_id: i64) -> Self {
        let (tx, _) = watch::channel(BookingState::new(professional_id));
        Self { tx }
    }

    /// Apply an action and return the resulting state. Subscribers are notified only when
    /// the state actually changed.
    pub fn dispatch(&self, action: BookingAction) -> BookingState {
        debug!(?action, "booking action");
        self.tx.send_if_modified(|state| {
            let next = reduce(state, action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });
        self.state()
    }

    pub fn state(&self) -> BookingState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BookingState> {
        self.tx.subscribe()
    }
}
