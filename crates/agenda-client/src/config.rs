//! Client configuration.
//!
//! Values come from serde defaults, then an optional TOML file, then the `AGENDA_*`
//! environment variables (highest precedence).

use std::path::{Path, PathBuf};
use std::time::Duration;

use agenda_engine::EngineError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};
use crate::log_batcher::BatcherConfig;

pub const ENV_API_URL: &str = "AGENDA_API_URL";
pub const ENV_TIMEZONE: &str = "AGENDA_TIMEZONE";
pub const ENV_SESSION_FILE: &str = "AGENDA_SESSION_FILE";

const APP_DIR: &str = "agenda";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST backend, including the version prefix.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout: u64,
    pub log_flush_interval_ms: u64,
    pub log_buffer_size: usize,
    /// IANA zone that working hours and calendar days are expressed in.
    pub timezone: String,
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout: 10,
            log_flush_interval_ms: 3000,
            log_buffer_size: 20,
            timezone: "UTC".to_string(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Load configuration and apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `<config dir>/agenda/config.toml` is read
    /// when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match default_config_file().filter(|p| p.exists()) {
                Some(path) => Self::read_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(zone) = get(ENV_TIMEZONE) {
            self.timezone = zone;
        }
        if let Some(path) = get(ENV_SESSION_FILE) {
            self.session_file = Some(PathBuf::from(path));
        }
    }

    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api_url)?)
    }

    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| ClientError::Engine(EngineError::InvalidTimezone(self.timezone.clone())))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            flush_interval: Duration::from_millis(self.log_flush_interval_ms.max(1)),
            max_buffer: self.log_buffer_size.max(1),
        }
    }

    /// Where the session document lives.
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("session.json")
        })
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
