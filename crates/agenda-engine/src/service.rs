//! Services offered by a professional.

use serde::{Deserialize, Serialize};

use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub professional_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Length in minutes.
    pub duration: i64,
    #[serde(default, with = "wire::price")]
    pub price: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Payload for creating or updating a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration: i64,
    pub price: f64,
    pub active: bool,
}
