//! Graph analysis over a workflow's nodes and edges (§4.1): topological
//! ordering, cycle detection, dependency-level assignment, and reachability.

mod dependency_graph;
mod levels;
mod reachability;

pub use dependency_graph::{edge_pairs, loop_child_pairs, DependencyGraph};
pub use levels::assign_levels;
pub use reachability::{reachable_backward, reachable_forward};
