//! REST client for the agenda backend.
//!
//! [`ApiClient`] owns the HTTP connection pool, the base URL and the session. Every request
//! carries the session's bearer token when one exists; a `401` answer invalidates the
//! session. With a [`LogBatcher`] attached, failed and slow requests are recorded as
//! telemetry.

mod appointments;
mod auth;
mod logs;
mod professionals;
mod schedule;
mod services;

pub use appointments::AvailableSlots;
pub use logs::HttpLogSink;

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use agenda_engine::account::User;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::log_batcher::{LogBatcher, LogEntry, LogLevel};
use crate::session::{KeyValueStore, MemoryStore, SessionManager};

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(2000);

pub struct ApiClient<S: KeyValueStore = MemoryStore> {
    http: Client,
    base: Url,
    session: Mutex<SessionManager<S>>,
    batcher: Option<LogBatcher>,
    slow_threshold: Duration,
}

impl ApiClient<MemoryStore> {
    /// Client with default settings and an in-memory session.
    pub fn new(api_url: &str) -> Result<Self> {
        Self::from_parts(Client::new(), Url::parse(api_url)?, MemoryStore::new())
    }
}

impl<S: KeyValueStore> ApiClient<S> {
    pub fn with_store(config: &ClientConfig, store: S) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Self::from_parts(http, config.base_url()?, store)
    }

    pub fn from_parts(http: Client, base: Url, store: S) -> Result<Self> {
        Ok(Self {
            http,
            base: normalize_base(base),
            session: Mutex::new(SessionManager::new(store)),
            batcher: None,
            slow_threshold: SLOW_REQUEST_THRESHOLD,
        })
    }

    pub fn with_log_batcher(mut self, batcher: LogBatcher) -> Self {
        self.batcher = Some(batcher);
        self
    }

    /// Requests that take longer than `threshold` are recorded as `SLOW_REQUEST`.
    pub fn with_slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Sink that posts entries to this backend without going through request observation.
    pub fn log_sink(&self) -> Result<HttpLogSink> {
        Ok(HttpLogSink::new(self.http.clone(), self.url("logs/frontend")?))
    }

    fn session(&self) -> MutexGuard<'_, SessionManager<S>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn session_user(&self) -> Option<User> {
        self.session().user().cloned()
    }

    fn token(&self) -> Option<String> {
        self.session().token().map(str::to_owned)
    }

    fn require_token(&self) -> Result<String> {
        self.token().ok_or(ClientError::NotAuthenticated)
    }

    /// Resolve a path relative to the API base. Paths never start with `/`.
    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.url(path)?))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let token = self.token();
        self.send_with(builder, token.as_deref()).await
    }

    async fn send_with(&self, builder: RequestBuilder, token: Option<&str>) -> Result<Response> {
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!(%method, %url, "dispatching request");

        let started = Instant::now();
        let result = self.http.execute(request).await;
        let elapsed = started.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.observe_failure(&method, &url, None, elapsed, None);
                return Err(e.into());
            }
        };

        let status = response.status();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if !status.is_success() {
            self.observe_failure(&method, &url, Some(status), elapsed, trace_id);
            if status == StatusCode::UNAUTHORIZED {
                warn!(%url, "unauthorized response; invalidating session");
                self.session().invalidate();
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        if elapsed > self.slow_threshold {
            self.observe_slow(&method, &url, status, elapsed, trace_id);
        }
        Ok(response)
    }

    fn observe_failure(
        &self,
        method: &Method,
        url: &str,
        status: Option<StatusCode>,
        elapsed: Duration,
        trace_id: Option<String>,
    ) {
        let Some(batcher) = &self.batcher else {
            return;
        };
        let code = status.map(|s| s.as_u16()).unwrap_or(0);
        let entry = LogEntry::new(
            LogLevel::Error,
            "HTTP_ERROR",
            format!("{} {} failed with {}", method, url, code),
        )
        .with_trace_id(trace_id)
        .with_metadata(json!({
            "status": code,
            "statusText": status.and_then(|s| s.canonical_reason()).unwrap_or(""),
            "duration": elapsed.as_millis() as u64,
            "url": url,
        }));
        batcher.record(entry);
    }

    fn observe_slow(
        &self,
        method: &Method,
        url: &str,
        status: StatusCode,
        elapsed: Duration,
        trace_id: Option<String>,
    ) {
        let Some(batcher) = &self.batcher else {
            return;
        };
        let millis = elapsed.as_millis() as u64;
        let entry = LogEntry::new(
            LogLevel::Warn,
            "SLOW_REQUEST",
            format!("{} {} took {}ms", method, url, millis),
        )
        .with_trace_id(trace_id)
        .with_metadata(json!({ "duration": millis, "status": status.as_u16() }));
        batcher.record(entry);
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self.request(Method::GET, path)?.query(query);
        decode(self.send(builder).await?).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(method, path)?.json(body);
        decode(self.send(builder).await?).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path)?;
        self.send(builder).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_version_prefix() {
        let client = ApiClient::new("http://localhost:8000/api/v1").unwrap();
        assert_eq!(
            client.url("/working-hours/").unwrap().as_str(),
            "http://localhost:8000/api/v1/working-hours/"
        );
        assert_eq!(
            client.url("services/professional/3").unwrap().as_str(),
            "http://localhost:8000/api/v1/services/professional/3"
        );
    }

    #[test]
    fn new_client_has_no_session() {
        let client = ApiClient::new("http://localhost:8000/api/v1").unwrap();
        assert!(!client.is_authenticated());
        assert!(matches!(client.require_token(), Err(ClientError::NotAuthenticated)));
    }
}
