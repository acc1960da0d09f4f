// SPDX-License-Identifier: MIT

use std::collections::{HashSet, VecDeque};

/// All nodes reachable from `start` by following edges in the direction
/// given (`forward`), including `start` itself. Used by control-flow
/// executors (`condition`, `path`, `fork`) to mark a whole downstream branch
/// skipped (§4.9).
fn reachable(start: &str, adjacency: &std::collections::HashMap<String, Vec<String>>) -> HashSet<String> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start.to_string());
    queue.push_back(start.to_string());

    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(&current) {
            for neighbor in neighbors {
                if visited.insert(neighbor.clone()) {
                    queue.push_back(neighbor.clone());
                }
            }
        }
    }

    visited
}

fn forward_adjacency(edges: &[(String, String)]) -> std::collections::HashMap<String, Vec<String>> {
    let mut adjacency: std::collections::HashMap<String, Vec<String>> = std::collections::HashMap::new();
    for (source, target) in edges {
        adjacency.entry(source.clone()).or_default().push(target.clone());
    }
    adjacency
}

fn reverse_adjacency(edges: &[(String, String)]) -> std::collections::HashMap<String, Vec<String>> {
    let mut adjacency: std::collections::HashMap<String, Vec<String>> = std::collections::HashMap::new();
    for (source, target) in edges {
        adjacency.entry(target.clone()).or_default().push(source.clone());
    }
    adjacency
}

/// Nodes reachable from `start` by walking edges downstream (source →
/// target), including `start`.
pub fn reachable_forward(start: &str, edges: &[(String, String)]) -> HashSet<String> {
    reachable(start, &forward_adjacency(edges))
}

/// Nodes that can reach `start` by walking edges upstream (target → source),
/// including `start`. Used to check whether a node is still reachable from
/// any entry point once some branches have been skipped.
pub fn reachable_backward(start: &str, edges: &[(String, String)]) -> HashSet<String> {
    reachable(start, &reverse_adjacency(edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reachability_includes_whole_downstream_branch() {
        let edges = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
            ("a".to_string(), "d".to_string()),
        ];
        let reached = reachable_forward("b", &edges);
        assert!(reached.contains("b"));
        assert!(reached.contains("c"));
        assert!(!reached.contains("d"));
    }

    #[test]
    fn backward_reachability_finds_ancestors() {
        let edges = vec![("a".to_string(), "b".to_string()), ("b".to_string(), "c".to_string())];
        let reached = reachable_backward("c", &edges);
        assert!(reached.contains("a"));
        assert!(reached.contains("b"));
        assert!(reached.contains("c"));
    }
}
