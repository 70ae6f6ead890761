use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Method};
use url::Url;

use super::ApiClient;
use crate::error::{ClientError, Result};
use crate::log_batcher::{LogEntry, LogSink};
use crate::session::KeyValueStore;

/// Posts single entries to `logs/frontend`. Unauthenticated and unobserved, so a failing
/// log endpoint cannot feed back into the batcher.
#[derive(Debug, Clone)]
pub struct HttpLogSink {
    http: Client,
    url: Url,
}

impl HttpLogSink {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }
}

impl LogSink for HttpLogSink {
    fn send(&self, entry: LogEntry) -> BoxFuture<'static, Result<()>> {
        let http = self.http.clone();
        let url = self.url.clone();
        async move {
            let response = http.post(url).json(&entry).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::from_response(status.as_u16(), &body))
            }
        }
        .boxed()
    }
}

impl<S: KeyValueStore> ApiClient<S> {
    pub async fn submit_log(&self, entry: &LogEntry) -> Result<()> {
        let builder = self.request(Method::POST, "logs/frontend")?.json(entry);
        self.send(builder).await?;
        Ok(())
    }
}
