// SPDX-License-Identifier: MIT

use super::DependencyGraph;
use crate::errors::GraphError;
use std::collections::HashMap;

/// Assigns each node a dependency level: `level(v) = 1 + max(level(u))` over
/// `v`'s direct predecessors, with entry points at level 0 (§4.1). The
/// orchestrator drives execution one level at a time, so this is the grouping
/// it walks.
///
/// Returns levels keyed by node id alongside the nodes grouped into each
/// level in ascending order.
pub fn assign_levels(
    graph: &DependencyGraph,
    edges: &[(String, String)],
) -> Result<(HashMap<String, usize>, Vec<Vec<String>>), GraphError> {
    let order = graph.topological_sort()?;

    let mut predecessors: HashMap<&str, Vec<&str>> = HashMap::new();
    for id in graph.node_ids() {
        predecessors.insert(id.as_str(), Vec::new());
    }
    for (source, target) in edges {
        predecessors.entry(target.as_str()).or_default().push(source.as_str());
    }

    let mut levels: HashMap<String, usize> = HashMap::new();
    for id in &order {
        let preds = predecessors.get(id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let level = preds
            .iter()
            .map(|p| levels.get(*p).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        levels.insert(id.clone(), level);
    }

    let max_level = levels.values().copied().max().unwrap_or(0);
    let mut grouped: Vec<Vec<String>> = vec![Vec::new(); max_level + 1];
    for id in &order {
        grouped[levels[id]].push(id.clone());
    }

    Ok((levels, grouped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeType, Node, NodeType, WorkflowDefinition};

    fn node(id: &str) -> Node {
        Node { id: id.to_string(), node_type: NodeType::Action, name: id.to_string(), config: serde_json::Value::Null, retry: None, error_handling: None }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge { source: source.to_string(), target: target.to_string(), edge_type: EdgeType::Normal, condition: None }
    }

    #[test]
    fn diamond_levels() {
        let wf = WorkflowDefinition {
            id: "wf".into(),
            name: "wf".into(),
            version: "1.0.0".into(),
            variables: Default::default(),
            nodes: vec![node("a"), node("b"), node("c"), node("d")],
            edges: vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")],
            config: Default::default(),
            user: None,
        };
        let graph = DependencyGraph::from_workflow(&wf);
        let edge_pairs: Vec<(String, String)> =
            wf.edges.iter().map(|e| (e.source.clone(), e.target.clone())).collect();
        let (levels, grouped) = assign_levels(&graph, &edge_pairs).unwrap();
        assert_eq!(levels["a"], 0);
        assert_eq!(levels["b"], 1);
        assert_eq!(levels["c"], 1);
        assert_eq!(levels["d"], 2);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0], vec!["a".to_string()]);
    }
}
