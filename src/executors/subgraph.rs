// SPDX-License-Identifier: MIT

//! BFS downstream-reachability that stops at `fork-branch` edges, shared by
//! `path` (collecting its own gated subgraph) and `fork` (sizing each
//! branch against `max_nodes_per_path`) — §4.9.

use crate::executor::Engine;
use crate::model::EdgeType;
use std::collections::{HashSet, VecDeque};

pub(crate) fn downstream_not_crossing_fork_branch(engine: &Engine, start: &str) -> HashSet<String> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start.to_string());
    queue.push_back(start.to_string());

    while let Some(current) = queue.pop_front() {
        for edge in engine.workflow.outgoing_edges(&current) {
            if edge.edge_type == EdgeType::ForkBranch {
                continue;
            }
            if visited.insert(edge.target.clone()) {
                queue.push_back(edge.target.clone());
            }
        }
    }

    visited
}
