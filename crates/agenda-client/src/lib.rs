//! # agenda-client
//!
//! Async side of the booking client: the REST client for the agenda backend, the
//! persisted authentication session, best-effort telemetry batching, and the booking
//! state store that feeds client-computed availability from [`agenda_engine`].
//!
//! ## Modules
//!
//! - [`api`] — `ApiClient`, one method per backend operation
//! - [`session`] — `SessionManager` over a `KeyValueStore`
//! - [`log_batcher`] — timer/size triggered delivery of `LogEntry` values
//! - [`booking`] — action/reducer state for the booking flow, published via `watch`
//! - [`availability`] — fetch, compute and dispatch slots for the current query
//! - [`config`] — `ClientConfig` from TOML and environment
//! - [`error`] — Error types

pub mod api;
pub mod availability;
pub mod booking;
pub mod config;
pub mod error;
pub mod log_batcher;
pub mod session;

pub use api::{ApiClient, AvailableSlots, HttpLogSink};
pub use availability::AvailabilityService;
pub use booking::{reduce, BookingAction, BookingState, BookingStore, SlotQuery};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use log_batcher::{BatcherConfig, LogBatcher, LogEntry, LogLevel, LogSink};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionManager};
