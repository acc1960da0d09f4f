// SPDX-License-Identifier: MIT

//! Event log entries (§3).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The event types the coordinator's event log records (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    NodeStarted,
    NodeCompleted,
    NodeSkipped,
    NodeFailed,
    NodeRetryFailed,
    WorkflowHaltRequested,
}

/// One entry in the run's append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: EventType,
    pub node_id: Option<String>,
    pub data: Value,
}

impl Event {
    pub fn new(event_type: EventType, node_id: Option<String>, data: Value) -> Self {
        Self { timestamp: chrono::Utc::now(), event_type, node_id, data }
    }
}
