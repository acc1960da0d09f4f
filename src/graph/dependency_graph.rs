// SPDX-License-Identifier: MIT

use crate::errors::GraphError;
use crate::model::{NodeType, WorkflowDefinition};
use std::collections::HashMap;

/// The `(source, target)` pairs `assign_levels`/`reachable_forward` want,
/// lifted out of a workflow's edge list once per use site.
pub fn edge_pairs(workflow: &WorkflowDefinition) -> Vec<(String, String)> {
    workflow.edges.iter().map(|e| (e.source.clone(), e.target.clone())).collect()
}

/// A `loop` node's declared children (`config.nodes`) aren't connected to it
/// by a real [`Edge`](crate::model::Edge) — §4.9 has the `loop` executor run
/// them itself, sequentially, once per iteration, by id. Without a virtual
/// `(loop_id, child_id)` pair standing in for that relationship, a child
/// would look unreachable from the start node to the validator (§4.2), and
/// would be handed its own level-0 slot in the top-level schedule (§4.1) —
/// running once, prematurely, with no loop frame installed — instead of only
/// ever running under the loop's own control.
pub fn loop_child_pairs(workflow: &WorkflowDefinition) -> Vec<(String, String)> {
    workflow
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Loop)
        .flat_map(|n| {
            n.config
                .get("nodes")
                .and_then(serde_json::Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(serde_json::Value::as_str)
                .map(move |child_id| (n.id.clone(), child_id.to_string()))
        })
        .collect()
}

/// A forward adjacency representation of a workflow's edges: `node_id -> [ids
/// that depend on it]`.
///
/// This orientation (source → dependents) is what Kahn's algorithm wants:
/// walking outgoing edges as a node's indegree reaches zero is how the next
/// ready set is discovered. Built once per run from the static
/// `WorkflowDefinition` and never mutated afterward.
#[derive(Debug, Clone)]
pub struct DependencyGraph(HashMap<String, Vec<String>>);

impl DependencyGraph {
    pub fn from_workflow(workflow: &WorkflowDefinition) -> Self {
        Self::from_ids_and_edges(workflow.nodes.iter().map(|n| n.id.as_str()), &edge_pairs(workflow))
    }

    /// Builds a graph over an arbitrary node-id set and edge list, used by
    /// control-flow executors to recompute levels over a subgraph rather
    /// than the whole workflow (§4.9 `path`/`fork`/`parallel`).
    pub fn from_ids_and_edges<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        edges: &[(String, String)],
    ) -> Self {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        for id in ids {
            graph.entry(id.to_string()).or_default();
        }
        for (source, target) in edges {
            graph.entry(source.clone()).or_default().push(target.clone());
        }
        Self(graph)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn dependents(&self, node_id: &str) -> &[String] {
        self.0.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Count of incoming edges for every node, used to seed Kahn's algorithm
    /// and to find the "no dependencies" frontier.
    pub fn build_dependency_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for id in self.0.keys() {
            counts.insert(id.clone(), 0);
        }
        for dependents in self.0.values() {
            for dependent in dependents {
                *counts.entry(dependent.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Kahn's algorithm. Returns the topological order, or a `CycleDetected`
    /// error carrying one offending cycle found via DFS.
    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        let mut counts = self.build_dependency_counts();
        let mut ready: Vec<String> =
            counts.iter().filter(|(_, &c)| c == 0).map(|(id, _)| id.clone()).collect();
        ready.sort();

        let mut order = Vec::with_capacity(self.0.len());
        let mut queue = std::collections::VecDeque::from(ready);

        while let Some(node_id) = queue.pop_front() {
            order.push(node_id.clone());
            for dependent in self.dependents(&node_id) {
                if let Some(count) = counts.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent.clone());
                    }
                }
            }
        }

        if order.len() == self.0.len() {
            Ok(order)
        } else {
            Err(GraphError::CycleDetected { cycle: self.find_a_cycle() })
        }
    }

    /// DFS with a three-color recursion stack, used only to produce a
    /// human-readable cycle path once Kahn's algorithm has already told us
    /// one exists.
    fn find_a_cycle(&self) -> Vec<String> {
        const UNVISITED: u8 = 0;
        const VISITING: u8 = 1;
        const VISITED: u8 = 2;

        let mut state: HashMap<&str, u8> =
            self.0.keys().map(|k| (k.as_str(), UNVISITED)).collect();
        let mut path = Vec::new();

        fn visit<'a>(
            graph: &'a DependencyGraph,
            node: &'a str,
            state: &mut HashMap<&'a str, u8>,
            path: &mut Vec<String>,
        ) -> Option<Vec<String>> {
            state.insert(node, VISITING);
            path.push(node.to_string());

            for dependent in graph.dependents(node) {
                match state.get(dependent.as_str()).copied().unwrap_or(UNVISITED) {
                    VISITING => {
                        let start = path.iter().position(|n| n == dependent).unwrap();
                        let mut cycle = path[start..].to_vec();
                        cycle.push(dependent.clone());
                        return Some(cycle);
                    }
                    UNVISITED => {
                        if let Some(cycle) =
                            visit(graph, dependent.as_str(), state, path)
                        {
                            return Some(cycle);
                        }
                    }
                    _ => {}
                }
            }

            state.insert(node, VISITED);
            path.pop();
            None
        }

        let mut ids: Vec<&str> = self.0.keys().map(String::as_str).collect();
        ids.sort();
        for id in ids {
            if state.get(id).copied().unwrap_or(UNVISITED) == UNVISITED {
                if let Some(cycle) = visit(self, id, &mut state, &mut path) {
                    return cycle;
                }
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeType, Node, NodeType, WorkflowDefinition};

    fn node(id: &str, node_type: NodeType) -> Node {
        Node {
            id: id.to_string(),
            node_type,
            name: id.to_string(),
            config: serde_json::Value::Null,
            retry: None,
            error_handling: None,
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge { source: source.to_string(), target: target.to_string(), edge_type: EdgeType::Normal, condition: None }
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf".to_string(),
            name: "wf".to_string(),
            version: "1.0.0".to_string(),
            variables: Default::default(),
            nodes,
            edges,
            config: Default::default(),
            user: None,
        }
    }

    #[test]
    fn diamond_topological_order_respects_dependencies() {
        let wf = workflow(
            vec![
                node("a", NodeType::Start),
                node("b", NodeType::Action),
                node("c", NodeType::Action),
                node("d", NodeType::End),
            ],
            vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")],
        );
        let graph = DependencyGraph::from_workflow(&wf);
        let order = graph.topological_sort().unwrap();
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn cycle_is_detected() {
        let wf = workflow(
            vec![node("a", NodeType::Start), node("b", NodeType::Action), node("c", NodeType::Action)],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
        );
        let graph = DependencyGraph::from_workflow(&wf);
        let err = graph.topological_sort().unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }
}
