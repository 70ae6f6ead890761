use agenda_engine::account::{Professional, ProfileUpdate};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;
use crate::session::KeyValueStore;

impl<S: KeyValueStore> ApiClient<S> {
    /// Active professionals, optionally narrowed to a speciality (case-insensitive substring).
    ///
    /// The filter is sent as a query parameter and applied again locally, so it holds even
    /// when the backend ignores it.
    pub async fn search_professionals(&self, speciality: Option<&str>) -> Result<Vec<Professional>> {
        let needle = speciality.map(str::trim).filter(|s| !s.is_empty());
        let query: Vec<(&str, String)> = needle
            .map(|s| vec![("speciality", s.to_string())])
            .unwrap_or_default();
        let professionals: Vec<Professional> = self.get_json("professionals/", &query).await?;

        Ok(match needle {
            None => professionals,
            Some(needle) => {
                let needle = needle.to_lowercase();
                professionals
                    .into_iter()
                    .filter(|p| {
                        p.speciality
                            .as_deref()
                            .is_some_and(|s| s.to_lowercase().contains(&needle))
                    })
                    .collect()
            }
        })
    }

    pub async fn professional(&self, id: i64) -> Result<Professional> {
        self.get_json(&format!("professionals/{}", id), &[]).await
    }

    pub async fn update_professional(&self, id: i64, profile: &ProfileUpdate) -> Result<Professional> {
        self.send_json(Method::PUT, &format!("professionals/{}", id), profile).await
    }
}
