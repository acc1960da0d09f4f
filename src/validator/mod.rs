// SPDX-License-Identifier: MIT

//! Workflow validation (§4.2): a fixed-order pipeline of structural checks
//! that accumulates every error it finds rather than stopping at the first.

use crate::errors::{ValidationError, ValidationIssue};
use crate::graph::DependencyGraph;
use crate::model::{NodeType, WorkflowDefinition};
use std::collections::{HashMap, HashSet};

/// Runs the full validation pipeline against a workflow definition.
///
/// Order matters: duplicate-id and dangling-edge checks run first because
/// cycle detection and reachability analysis assume a structurally sound
/// node/edge set. `MissingNodeConfig` is collected separately as a warning
/// and never blocks validation.
pub fn validate_workflow(workflow: &WorkflowDefinition) -> Result<Vec<ValidationIssue>, ValidationError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    errors.extend(check_required_fields(workflow));
    errors.extend(check_duplicate_node_ids(workflow));
    errors.extend(check_node_types(workflow));
    errors.extend(check_dangling_edges(workflow));
    errors.extend(check_self_loops(workflow));

    let (entry_errors, entry_ok) = check_entry_points(workflow);
    errors.extend(entry_errors);

    if errors.is_empty() {
        let graph = DependencyGraph::from_workflow(workflow);
        if let Err(cycle_err) = graph.topological_sort() {
            errors.push(ValidationIssue::CyclicDependency {
                cycle: match cycle_err {
                    crate::errors::GraphError::CycleDetected { cycle } => cycle,
                    _ => Vec::new(),
                },
            });
        } else if entry_ok {
            errors.extend(check_reachability(workflow));
        }
    }

    warnings.extend(check_missing_config(workflow));

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ValidationError { errors, warnings })
    }
}

fn check_required_fields(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if workflow.id.trim().is_empty() {
        issues.push(ValidationIssue::MissingField { field: "id" });
    }
    if workflow.name.trim().is_empty() {
        issues.push(ValidationIssue::MissingField { field: "name" });
    }
    if workflow.nodes.is_empty() {
        issues.push(ValidationIssue::EmptyNodeList);
    }
    issues
}

fn check_duplicate_node_ids(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for node in &workflow.nodes {
        if !seen.insert(node.id.as_str()) {
            issues.push(ValidationIssue::DuplicateNodeId { node_id: node.id.clone() });
        }
    }
    issues
}

/// Node types are already a closed `enum` validated at deserialization time;
/// this only catches cases where config shape is wrong for the declared
/// type, e.g. a `condition` node with no usable expression.
fn check_node_types(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for node in &workflow.nodes {
        if matches!(node.node_type, NodeType::Condition | NodeType::DataTransform | NodeType::Formation)
            && !node.has_config()
        {
            issues.push(ValidationIssue::InvalidNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.as_str().to_string(),
            });
        }
    }
    issues
}

fn check_dangling_edges(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    let node_ids: HashSet<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut issues = Vec::new();
    for edge in &workflow.edges {
        if !node_ids.contains(edge.source.as_str()) {
            issues.push(ValidationIssue::DanglingEdgeEndpoint {
                edge_source: edge.source.clone(),
                edge_target: edge.target.clone(),
                missing: edge.source.clone(),
            });
        }
        if !node_ids.contains(edge.target.as_str()) {
            issues.push(ValidationIssue::DanglingEdgeEndpoint {
                edge_source: edge.source.clone(),
                edge_target: edge.target.clone(),
                missing: edge.target.clone(),
            });
        }
    }
    issues
}

fn check_self_loops(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    workflow
        .edges
        .iter()
        .filter(|e| e.source == e.target)
        .map(|e| ValidationIssue::SelfLoop { node_id: e.source.clone() })
        .collect()
}

/// Returns the entry-point errors plus whether exactly one entry point was
/// found (reachability analysis is only meaningful when this holds).
fn check_entry_points(workflow: &WorkflowDefinition) -> (Vec<ValidationIssue>, bool) {
    let entry_points: Vec<&str> = workflow
        .nodes
        .iter()
        .filter(|n| n.node_type.is_entry_point())
        .map(|n| n.id.as_str())
        .collect();

    let mut issues = Vec::new();
    match entry_points.len() {
        0 => {
            issues.push(ValidationIssue::MissingStartNode);
            return (issues, false);
        }
        1 => {}
        _ => {
            issues.push(ValidationIssue::MultipleStartNodes {
                node_ids: entry_points.iter().map(|s| s.to_string()).collect(),
            });
            return (issues, false);
        }
    }

    let start_id = entry_points[0];
    if workflow.incoming_edges(start_id).next().is_some() {
        issues.push(ValidationIssue::StartNodeHasIncomingEdges { node_id: start_id.to_string() });
    }

    let ok = issues.is_empty();
    (issues, ok)
}

fn check_reachability(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    let start_id = workflow
        .nodes
        .iter()
        .find(|n| n.node_type.is_entry_point())
        .map(|n| n.id.as_str())
        .expect("entry point presence already checked");

    let mut edges: Vec<(String, String)> =
        workflow.edges.iter().map(|e| (e.source.clone(), e.target.clone())).collect();
    edges.extend(crate::graph::loop_child_pairs(workflow));
    let reached = crate::graph::reachable_forward(start_id, &edges);

    workflow
        .nodes
        .iter()
        .filter(|n| !reached.contains(n.id.as_str()))
        .map(|n| ValidationIssue::UnreachableNode { node_id: n.id.clone() })
        .collect()
}

fn check_missing_config(workflow: &WorkflowDefinition) -> Vec<ValidationIssue> {
    workflow
        .nodes
        .iter()
        .filter(|n| {
            matches!(
                n.node_type,
                NodeType::Action | NodeType::HttpRequest | NodeType::DataTransform | NodeType::Formation
            ) && !n.has_config()
        })
        .map(|n| ValidationIssue::MissingNodeConfig { node_id: n.id.clone() })
        .collect()
}

/// Dependency counts, exposed for callers (e.g. the orchestrator) that want
/// to confirm graph shape without re-running the full pipeline.
pub fn build_dependency_counts(workflow: &WorkflowDefinition) -> HashMap<String, usize> {
    DependencyGraph::from_workflow(workflow).build_dependency_counts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeType, Node, RunConfig};
    use serde_json::json;

    fn node(id: &str, node_type: NodeType, config: serde_json::Value) -> Node {
        Node { id: id.to_string(), node_type, name: id.to_string(), config, retry: None, error_handling: None }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge { source: source.to_string(), target: target.to_string(), edge_type: EdgeType::Normal, condition: None }
    }

    fn base_workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf-1".into(),
            name: "Test".into(),
            version: "1.0.0".into(),
            variables: Default::default(),
            nodes,
            edges,
            config: RunConfig::default(),
            user: None,
        }
    }

    #[test]
    fn linear_workflow_validates_clean() {
        let wf = base_workflow(
            vec![
                node("start", NodeType::Start, serde_json::Value::Null),
                node("act", NodeType::Action, json!({"op": "noop"})),
                node("end", NodeType::End, serde_json::Value::Null),
            ],
            vec![edge("start", "act"), edge("act", "end")],
        );
        assert!(validate_workflow(&wf).is_ok());
    }

    #[test]
    fn missing_start_node_is_rejected() {
        let wf = base_workflow(vec![node("a", NodeType::Action, json!({}))], vec![]);
        let err = validate_workflow(&wf).unwrap_err();
        assert!(err.errors.iter().any(|i| matches!(i, ValidationIssue::MissingStartNode)));
    }

    #[test]
    fn cycle_is_rejected() {
        let wf = base_workflow(
            vec![
                node("start", NodeType::Start, serde_json::Value::Null),
                node("a", NodeType::Action, json!({})),
                node("b", NodeType::Action, json!({})),
            ],
            vec![edge("start", "a"), edge("a", "b"), edge("b", "a")],
        );
        let err = validate_workflow(&wf).unwrap_err();
        assert!(err.errors.iter().any(|i| matches!(i, ValidationIssue::CyclicDependency { .. })));
    }

    #[test]
    fn unreachable_node_is_flagged() {
        let wf = base_workflow(
            vec![
                node("start", NodeType::Start, serde_json::Value::Null),
                node("end", NodeType::End, serde_json::Value::Null),
                node("orphan", NodeType::Action, json!({})),
            ],
            vec![edge("start", "end")],
        );
        let err = validate_workflow(&wf).unwrap_err();
        assert!(err.errors.iter().any(|i| matches!(i, ValidationIssue::UnreachableNode { node_id } if node_id == "orphan")));
    }
}
