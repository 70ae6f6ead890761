//! Error types for agenda-client operations.

use agenda_engine::EngineError;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("No service and slot selected")]
    SelectionIncomplete,

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Build an `Api` error from a non-success status and its raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<Value>(body) {
            Ok(json) => flatten_detail(&json),
            Err(_) => body.trim().to_string(),
        };
        ClientError::Api { status, detail }
    }

    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the person using the application.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status, detail } => match status {
                401 => "Session expired. Please sign in again.".to_string(),
                403 => "Access denied. You do not have permission to perform this action.".to_string(),
                404 => "Resource not found.".to_string(),
                422 if !detail.is_empty() => detail.clone(),
                422 => "Validation error in the submitted data.".to_string(),
                500 => "Internal server error. Please try again later.".to_string(),
                _ if !detail.is_empty() => detail.clone(),
                other => format!("Error {}", other),
            },
            ClientError::Http(_) => "Could not reach the server.".to_string(),
            ClientError::NotAuthenticated => "Please sign in first.".to_string(),
            ClientError::SelectionIncomplete => "Choose a service, a date and a time first.".to_string(),
            other => format!("Error: {}", other),
        }
    }
}

/// Flatten a backend error body into one line.
///
/// Validation failures arrive as `{"detail": [{"loc": [..., field], "msg": ...}]}` and become
/// `field: msg; field: msg`. A string `detail` is returned as-is.
pub fn flatten_detail(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let field = item
                    .get("loc")
                    .and_then(Value::as_array)
                    .and_then(|loc| loc.last())
                    .map(|last| match last {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                let msg = item.get("msg").and_then(Value::as_str).unwrap_or_default();
                if field.is_empty() {
                    msg.to_string()
                } else {
                    format!("{}: {}", field, msg)
                }
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}
