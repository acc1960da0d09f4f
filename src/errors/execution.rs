// SPDX-License-Identifier: MIT

//! Errors raised during node execution and orchestration (§7).

use super::{ExpressionError, TemplateError};
use thiserror::Error;

/// Errors that can surface while running a workflow.
///
/// Most of these are per-node and absorbed by retry/routing before they ever
/// reach the orchestrator (§4.8 step 4, §7 "Propagation policy"); the
/// orchestrator only ever sees one bubble up when a node has neither
/// `continue_on_error` nor success/error routing.
#[derive(Debug, Error, Clone)]
pub enum ExecutionError {
    /// The executor registry has no factory for this type tag.
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// A node's `execute` returned an error and no retry/routing absorbed it.
    #[error("node '{node_id}' failed: {message}")]
    NodeExecutionFailed { node_id: String, message: String },

    /// A fan-out site's bounded pool did not finish within its configured
    /// timeout.
    #[error("{scope} timed out after {timeout_secs}s")]
    LevelTimeout { scope: String, timeout_secs: u64 },

    /// A `fork` node's downstream subgraph exceeded `max_nodes_per_path` or
    /// `max_total_nodes`.
    #[error("fork '{fork_id}' exceeded its node limit: {detail}")]
    ForkLimitExceeded { fork_id: String, detail: String },

    /// `coordinator.halt_workflow` was called; the run stopped between
    /// levels.
    #[error("workflow halted: {0}")]
    WorkflowHalted(String),

    /// An internal consistency error — should never happen if validation ran
    /// first, but defends against it rather than panicking.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// Config evaluation (§4.3 `evaluate_expression`) failed while preparing
    /// a node's inputs.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The safe expression evaluator (§4.5) rejected or failed to evaluate an
    /// expression, e.g. in a `condition` or `path` node.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),
}
