//! Professional-declared blocks during which nothing can be booked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub professional_id: i64,
    #[serde(with = "wire::datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "wire::datetime")]
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Block {
    /// The blocked interval, or `None` for a malformed record with `start >= end`.
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.start_time, self.end_time).ok()
    }
}

/// Blocked intervals of a set of blocks, skipping malformed records.
pub fn block_intervals(blocks: &[Block]) -> Vec<TimeInterval> {
    blocks.iter().filter_map(Block::interval).collect()
}

/// Payload for creating a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlock {
    pub professional_id: i64,
    #[serde(with = "wire::datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "wire::datetime")]
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
