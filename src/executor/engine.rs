// SPDX-License-Identifier: MIT

//! The per-run handle threaded through the orchestrator and every
//! control-flow executor: the static workflow, the coordinator, the
//! executor registry, and an optional cancellation signal.

use super::ExecutorRegistry;
use crate::coordinator::Coordinator;
use crate::model::{Node, WorkflowDefinition};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cheap to clone: every field is an `Arc` or already-`Clone` shared handle.
#[derive(Clone)]
pub struct Engine {
    pub workflow: Arc<WorkflowDefinition>,
    pub coordinator: Coordinator,
    pub registry: Arc<ExecutorRegistry>,
    pub cancellation: Option<CancellationToken>,
}

impl Engine {
    pub fn new(
        workflow: Arc<WorkflowDefinition>,
        coordinator: Coordinator,
        registry: Arc<ExecutorRegistry>,
        cancellation: Option<CancellationToken>,
    ) -> Self {
        Self { workflow, coordinator, registry, cancellation }
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.workflow.node(id).cloned()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}
