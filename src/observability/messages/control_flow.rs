// SPDX-License-Identifier: MIT

//! Messages for the control-flow executor family (§4.9).

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct ForkLaunched<'a> {
    pub fork_id: &'a str,
    pub total_paths: usize,
    pub wait_for_completion: bool,
}

impl Display for ForkLaunched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "fork '{}' launching {} path(s), wait_for_completion={}",
            self.fork_id, self.total_paths, self.wait_for_completion
        )
    }
}

impl StructuredLog for ForkLaunched<'_> {
    fn log(&self) {
        tracing::info!(fork_id = self.fork_id, total_paths = self.total_paths, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("fork", span_name = name, fork_id = self.fork_id, total_paths = self.total_paths)
    }
}

pub struct ForkLimitExceeded<'a> {
    pub fork_id: &'a str,
    pub detail: &'a str,
}

impl Display for ForkLimitExceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "fork '{}' exceeded its node limit: {}", self.fork_id, self.detail)
    }
}

impl StructuredLog for ForkLimitExceeded<'_> {
    fn log(&self) {
        tracing::error!(fork_id = self.fork_id, detail = self.detail, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("fork_limit_exceeded", span_name = name, fork_id = self.fork_id)
    }
}

pub struct PathSubgraphExecuted<'a> {
    pub path_id: &'a str,
    pub node_count: usize,
}

impl Display for PathSubgraphExecuted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "path '{}' executed {} downstream node(s)", self.path_id, self.node_count)
    }
}

impl StructuredLog for PathSubgraphExecuted<'_> {
    fn log(&self) {
        tracing::debug!(path_id = self.path_id, node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("path_subgraph", span_name = name, path_id = self.path_id)
    }
}

pub struct JoinFallbackWrappedOutput<'a> {
    pub join_id: &'a str,
    pub source_id: &'a str,
}

impl Display for JoinFallbackWrappedOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "join '{}' source '{}' is not a fork/parallel node; wrapping its single output",
            self.join_id, self.source_id
        )
    }
}

impl StructuredLog for JoinFallbackWrappedOutput<'_> {
    fn log(&self) {
        tracing::warn!(join_id = self.join_id, source_id = self.source_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("join_fallback", span_name = name, join_id = self.join_id)
    }
}

pub struct LoopIterationCompleted<'a> {
    pub loop_id: &'a str,
    pub index: usize,
    pub len: usize,
}

impl Display for LoopIterationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "loop '{}' iteration {}/{} completed", self.loop_id, self.index + 1, self.len)
    }
}

impl StructuredLog for LoopIterationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(loop_id = self.loop_id, index = self.index, len = self.len, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("loop_iteration", span_name = name, loop_id = self.loop_id, index = self.index)
    }
}
