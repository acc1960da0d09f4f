// SPDX-License-Identifier: MIT

//! Messages for the orchestrator's run lifecycle (§4.10).

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct RunStarted<'a> {
    pub workflow_id: &'a str,
    pub node_count: usize,
    pub edge_count: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "starting workflow '{}': {} nodes, {} edges",
            self.workflow_id, self.node_count, self.edge_count
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(workflow_id = self.workflow_id, node_count = self.node_count, edge_count = self.edge_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("workflow_run", span_name = name, workflow_id = self.workflow_id)
    }
}

pub struct LevelsComputed {
    pub level_count: usize,
    pub node_count: usize,
}

impl Display for LevelsComputed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "computed {} dependency level(s) for {} node(s)", self.level_count, self.node_count)
    }
}

impl StructuredLog for LevelsComputed {
    fn log(&self) {
        tracing::info!(level_count = self.level_count, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("levels_computed", span_name = name, level_count = self.level_count)
    }
}

pub struct LevelStarted {
    pub level: usize,
    pub node_count: usize,
}

impl Display for LevelStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "level {}: scheduling {} node(s)", self.level, self.node_count)
    }
}

impl StructuredLog for LevelStarted {
    fn log(&self) {
        tracing::debug!(level = self.level, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("level", span_name = name, level = self.level)
    }
}

pub struct LevelTimedOut {
    pub level: usize,
    pub timeout_secs: u64,
}

impl Display for LevelTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "level {} timed out after {}s", self.level, self.timeout_secs)
    }
}

impl StructuredLog for LevelTimedOut {
    fn log(&self) {
        tracing::error!(level = self.level, timeout_secs = self.timeout_secs, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("level_timeout", span_name = name, level = self.level)
    }
}

pub struct RunCompleted<'a> {
    pub workflow_id: &'a str,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow '{}' completed in {:?}", self.workflow_id, self.duration)
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(workflow_id = self.workflow_id, duration_ms = self.duration.as_millis() as u64, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("run_completed", span_name = name, workflow_id = self.workflow_id)
    }
}

pub struct RunFailed<'a> {
    pub workflow_id: &'a str,
    pub node_id: Option<&'a str>,
    pub message: &'a str,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.node_id {
            Some(id) => write!(f, "workflow '{}' failed at node '{}': {}", self.workflow_id, id, self.message),
            None => write!(f, "workflow '{}' failed: {}", self.workflow_id, self.message),
        }
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow_id = self.workflow_id,
            node_id = self.node_id.unwrap_or_default(),
            message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("run_failed", span_name = name, workflow_id = self.workflow_id)
    }
}

pub struct HaltObserved<'a> {
    pub reason: &'a str,
}

impl Display for HaltObserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow halted between levels: {}", self.reason)
    }
}

impl StructuredLog for HaltObserved<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("halt_observed", span_name = name, reason = self.reason)
    }
}
