//! Working hours and blocks of a professional.

use agenda_engine::block::{Block, NewBlock};
use agenda_engine::WorkingHours;
use reqwest::Method;
use tracing::debug;

use super::ApiClient;
use crate::error::Result;
use crate::session::KeyValueStore;

impl<S: KeyValueStore> ApiClient<S> {
    pub async fn working_hours(&self, professional_id: i64) -> Result<Vec<WorkingHours>> {
        self.get_json(&format!("working-hours/professional/{}", professional_id), &[])
            .await
    }

    /// Replace the weekly schedule, one POST per record. Stops at the first failure.
    pub async fn save_working_hours(
        &self,
        professional_id: i64,
        records: &[WorkingHours],
    ) -> Result<Vec<WorkingHours>> {
        let mut saved = Vec::with_capacity(records.len());
        for record in records {
            let payload = WorkingHours {
                id: None,
                professional_id: Some(professional_id),
                ..record.clone()
            };
            debug!(professional_id, day = payload.day, "saving working hours");
            saved.push(self.send_json(Method::POST, "working-hours/", &payload).await?);
        }
        Ok(saved)
    }

    pub async fn blocks(&self, professional_id: i64) -> Result<Vec<Block>> {
        self.get_json("blocks/", &[("professional_id", professional_id.to_string())])
            .await
    }

    pub async fn create_block(&self, block: &NewBlock) -> Result<Block> {
        self.send_json(Method::POST, "blocks/", block).await
    }

    pub async fn delete_block(&self, id: i64) -> Result<()> {
        self.delete(&format!("blocks/{}", id)).await
    }
}
