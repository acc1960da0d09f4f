// SPDX-License-Identifier: MIT

//! Errors raised by the graph-algorithms layer (§4.1).

use thiserror::Error;

/// Errors produced while analyzing a node/edge graph.
///
/// `CycleDetected` carries the full cycle path so a caller can report exactly
/// which nodes participate, matching §7's requirement that the path "begins
/// and ends at the same node id."
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The graph is not a DAG. `cycle` begins and ends with the same node id
    /// and each consecutive pair is an edge in the original graph.
    #[error("cycle detected: {}", cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    /// A dependency-level computation was asked to run over a graph that
    /// turned out to contain a cycle (internal consistency guard; validation
    /// should have caught this already).
    #[error("cannot compute dependency levels: graph contains a cycle")]
    NotADag,

    /// A reachability query named a start node that does not exist in the
    /// graph.
    #[error("unknown start node '{0}' for reachability query")]
    UnknownStartNode(String),
}
