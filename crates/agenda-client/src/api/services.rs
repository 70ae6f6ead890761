use agenda_engine::service::{NewService, Service};
use reqwest::Method;

use super::ApiClient;
use crate::error::Result;
use crate::session::KeyValueStore;

impl<S: KeyValueStore> ApiClient<S> {
    pub async fn services_for(&self, professional_id: i64) -> Result<Vec<Service>> {
        self.get_json(&format!("services/professional/{}", professional_id), &[])
            .await
    }

    pub async fn create_service(&self, service: &NewService) -> Result<Service> {
        self.send_json(Method::POST, "services/", service).await
    }

    pub async fn update_service(&self, id: i64, service: &NewService) -> Result<Service> {
        self.send_json(Method::PUT, &format!("services/{}", id), service).await
    }

    pub async fn delete_service(&self, id: i64) -> Result<()> {
        self.delete(&format!("services/{}", id)).await
    }
}
