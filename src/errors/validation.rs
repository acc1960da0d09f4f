// SPDX-License-Identifier: MIT

//! Errors and warnings raised by the validator (§4.2).

use std::fmt;
use thiserror::Error;

/// A single structural or semantic problem found in a workflow definition.
///
/// The validator accumulates these rather than failing on the first problem,
/// so a caller sees every issue in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    EmptyNodeList,
    DuplicateNodeId { node_id: String },
    InvalidNodeType { node_id: String, node_type: String },
    DanglingEdgeEndpoint { edge_source: String, edge_target: String, missing: String },
    SelfLoop { node_id: String },
    CyclicDependency { cycle: Vec<String> },
    MissingStartNode,
    MultipleStartNodes { node_ids: Vec<String> },
    StartNodeHasIncomingEdges { node_id: String },
    UnreachableNode { node_id: String },
    MissingNodeConfig { node_id: String },
}

impl ValidationIssue {
    /// Warnings are non-fatal; everything else is an error that fails
    /// validation per §4.2 ("Missing `config` on a node is a warning, not an
    /// error").
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationIssue::MissingNodeConfig { .. })
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::EmptyNodeList => write!(f, "workflow must declare at least one node"),
            ValidationIssue::DuplicateNodeId { node_id } => {
                write!(f, "duplicate node id '{node_id}'")
            }
            ValidationIssue::InvalidNodeType { node_id, node_type } => {
                write!(f, "node '{node_id}' has invalid type '{node_type}'")
            }
            ValidationIssue::DanglingEdgeEndpoint { edge_source, edge_target, missing } => {
                write!(
                    f,
                    "edge {edge_source} -> {edge_target} references unknown node '{missing}'"
                )
            }
            ValidationIssue::SelfLoop { node_id } => {
                write!(f, "node '{node_id}' has a self-loop edge")
            }
            ValidationIssue::CyclicDependency { cycle } => {
                write!(f, "cycle detected: {}", cycle.join(" -> "))
            }
            ValidationIssue::MissingStartNode => {
                write!(f, "workflow must have exactly one start/trigger node, found none")
            }
            ValidationIssue::MultipleStartNodes { node_ids } => {
                write!(
                    f,
                    "workflow must have exactly one start/trigger node, found {}: {}",
                    node_ids.len(),
                    node_ids.join(", ")
                )
            }
            ValidationIssue::StartNodeHasIncomingEdges { node_id } => {
                write!(f, "start node '{node_id}' must not have incoming edges")
            }
            ValidationIssue::UnreachableNode { node_id } => {
                write!(f, "node '{node_id}' is not reachable from the start node")
            }
            ValidationIssue::MissingNodeConfig { node_id } => {
                write!(f, "node '{node_id}' has no config (warning)")
            }
        }
    }
}

/// The workflow definition failed validation. Carries every issue found,
/// separated into errors and warnings per §4.2.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("workflow validation failed with {} error(s): {}", errors.len(), errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}
