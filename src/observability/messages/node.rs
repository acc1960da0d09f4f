// SPDX-License-Identifier: MIT

//! Messages for the per-node lifecycle state machine (§4.8).

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct NodeStarted<'a> {
    pub node_id: &'a str,
    pub node_type: &'a str,
}

impl Display for NodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node '{}' ({}) started", self.node_id, self.node_type)
    }
}

impl StructuredLog for NodeStarted<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, node_type = self.node_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node", span_name = name, node_id = self.node_id, node_type = self.node_type)
    }
}

pub struct NodeSkipped<'a> {
    pub node_id: &'a str,
    pub reason: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node '{}' skipped: {}", self.node_id, self.reason)
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_skipped", span_name = name, node_id = self.node_id, reason = self.reason)
    }
}

pub struct NodeCompleted<'a> {
    pub node_id: &'a str,
    pub duration: std::time::Duration,
}

impl Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node '{}' completed in {:?}", self.node_id, self.duration)
    }
}

impl StructuredLog for NodeCompleted<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, duration_ms = self.duration.as_millis() as u64, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_completed", span_name = name, node_id = self.node_id)
    }
}

pub struct NodeRetryFailed<'a> {
    pub node_id: &'a str,
    pub attempt: u32,
    pub max_retries: u32,
    pub error: &'a str,
}

impl Display for NodeRetryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "node '{}' attempt {}/{} failed: {}",
            self.node_id, self.attempt, self.max_retries, self.error
        )
    }
}

impl StructuredLog for NodeRetryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            attempt = self.attempt,
            max_retries = self.max_retries,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("node_retry_failed", span_name = name, node_id = self.node_id, attempt = self.attempt)
    }
}

pub struct NodeFailed<'a> {
    pub node_id: &'a str,
    pub error: &'a str,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node '{}' failed: {}", self.node_id, self.error)
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(node_id = self.node_id, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("node_failed", span_name = name, node_id = self.node_id)
    }
}
