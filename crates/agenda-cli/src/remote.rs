//! Commands that talk to the booking backend.

use std::sync::Arc;

use agenda_client::{
    ApiClient, AvailabilityService, BookingAction, BookingStore, ClientConfig, ClientError, FileStore,
    LogBatcher,
};
use agenda_engine::slots::format_slot_start;
use agenda_engine::validation::{BlockDraft, GuestDraft, LoginDraft};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::local::render_slots;
use crate::Format;

pub struct BookRequest {
    pub professional: i64,
    pub service: i64,
    pub date: NaiveDate,
    pub time: String,
    pub notes: Option<String>,
    pub guest: Option<GuestDraft>,
}

pub struct Remote {
    client: Arc<ApiClient<FileStore>>,
    batcher: LogBatcher,
    zone: Tz,
}

/// Keep the backend error as the cause and lead with the message meant for people.
fn friendly(e: ClientError) -> anyhow::Error {
    let message = e.user_message();
    anyhow::Error::new(e).context(message)
}

impl Remote {
    pub fn connect(config: &ClientConfig, zone: Tz) -> Result<Self> {
        let session_path = config.session_path();
        let store = FileStore::open(&session_path)
            .with_context(|| format!("Failed to open session file: {}", session_path.display()))?;
        let client = ApiClient::with_store(config, store).context("Failed to create API client")?;
        let batcher = LogBatcher::new(client.log_sink()?, config.batcher_config());
        let client = client.with_log_batcher(batcher.clone());
        debug!(api = %client.base_url(), "connected");
        Ok(Self {
            client: Arc::new(client),
            batcher,
            zone,
        })
    }

    /// Hand buffered telemetry to the runtime before the process exits.
    pub async fn finish(&self) {
        self.batcher.flush();
        tokio::task::yield_now().await;
    }

    pub async fn login(&self, email: String, password: String) -> Result<String> {
        let credentials = LoginDraft { email, password }
            .validate()
            .map_err(|e| anyhow!("Invalid credentials: {}", e))?;
        let user = self.client.login(&credentials).await.map_err(friendly)?;
        Ok(format!("Signed in as {} <{}>", user.name, user.email))
    }

    pub fn logout(&self) -> String {
        self.client.logout();
        "Signed out".to_string()
    }

    pub fn whoami(&self) -> Result<String> {
        let user = self.client.session_user().ok_or_else(|| anyhow!("Not signed in"))?;
        Ok(serde_json::to_string_pretty(&user)?)
    }

    pub async fn search(&self, speciality: Option<&str>) -> Result<String> {
        let professionals = self.client.search_professionals(speciality).await.map_err(friendly)?;
        Ok(professionals
            .iter()
            .map(|p| {
                format!(
                    "{}\t{}\t{}\n",
                    p.id,
                    p.display_name(),
                    p.speciality.as_deref().unwrap_or("-")
                )
            })
            .collect())
    }

    fn availability(&self, professional: i64) -> AvailabilityService<FileStore> {
        AvailabilityService::new(Arc::clone(&self.client), BookingStore::new(professional), self.zone)
    }

    pub async fn available(
        &self,
        professional: i64,
        service_id: i64,
        date: NaiveDate,
        server: bool,
        format: Format,
    ) -> Result<String> {
        if server {
            let available = self
                .client
                .available_slots(professional, date, service_id)
                .await
                .map_err(friendly)?;
            return Ok(match format {
                Format::Json => serde_json::to_string_pretty(&available)?,
                Format::Text => available.slots.iter().map(|s| format!("{}\n", s)).collect(),
            });
        }

        let service = self.find_service(professional, service_id).await?;
        let availability = self.availability(professional);
        availability.select_service(service).await;
        let state = availability.select_date(date).await;
        if let Some(error) = state.error {
            bail!(error);
        }
        render_slots(&state.slots, &self.zone, format)
    }

    async fn find_service(&self, professional: i64, service_id: i64) -> Result<agenda_engine::service::Service> {
        self.client
            .services_for(professional)
            .await
            .map_err(friendly)?
            .into_iter()
            .find(|s| s.id == service_id && s.active)
            .ok_or_else(|| anyhow!("Service {} is not offered by professional {}", service_id, professional))
    }

    fn own_professional_id(&self) -> Result<i64> {
        let user = self.client.session_user().ok_or_else(|| anyhow!("Not signed in"))?;
        user.professional_id()
            .ok_or_else(|| anyhow!("{} is not a professional account", user.email))
    }

    pub async fn list_blocks(&self, professional: Option<i64>) -> Result<String> {
        let professional = match professional {
            Some(id) => id,
            None => self.own_professional_id()?,
        };
        let blocks = self.client.blocks(professional).await.map_err(friendly)?;
        let fmt = "%Y-%m-%d %H:%M";
        Ok(blocks
            .iter()
            .map(|b| {
                format!(
                    "{}\t{}\t{}\t{}\n",
                    b.id,
                    b.start_time.with_timezone(&self.zone).format(fmt),
                    b.end_time.with_timezone(&self.zone).format(fmt),
                    b.reason.as_deref().unwrap_or("")
                )
            })
            .collect())
    }

    pub async fn add_block(&self, draft: BlockDraft) -> Result<String> {
        let professional = self.own_professional_id()?;
        let block = draft
            .validate(professional, &self.zone, Utc::now())
            .map_err(|e| anyhow!("Invalid block: {}", e))?;
        let created = self.client.create_block(&block).await.map_err(friendly)?;
        Ok(format!("Created block #{}", created.id))
    }

    pub async fn remove_block(&self, id: i64) -> Result<String> {
        self.client.delete_block(id).await.map_err(friendly)?;
        Ok(format!("Deleted block #{}", id))
    }

    pub async fn book(&self, request: BookRequest) -> Result<String> {
        let guest = match request.guest {
            Some(draft) => Some(draft.validate().map_err(|e| anyhow!("Invalid guest details: {}", e))?),
            None if self.client.is_authenticated() => None,
            None => bail!("Sign in first, or book as a guest with --guest-name, --guest-email and --guest-phone"),
        };

        let service = self.find_service(request.professional, request.service).await?;
        let availability = self.availability(request.professional);
        availability.select_service(service).await;
        let state = availability.select_date(request.date).await;
        if let Some(error) = state.error {
            bail!(error);
        }

        let slot = state
            .slots
            .iter()
            .find(|s| format_slot_start(s, &self.zone) == request.time)
            .copied()
            .ok_or_else(|| anyhow!("No free slot at {} on {}", request.time, request.date))?;
        availability.store().dispatch(BookingAction::SelectSlot(slot));

        let appointment = match guest {
            Some(guest) => availability.book_as_guest(guest, request.notes).await,
            None => availability.book(request.notes).await,
        }
        .map_err(friendly)?;

        Ok(format!(
            "Booked appointment #{} on {} ({})",
            appointment.id,
            appointment.date_time.with_timezone(&self.zone).format("%Y-%m-%d %H:%M"),
            appointment.status
        ))
    }
}
