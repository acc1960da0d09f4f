// SPDX-License-Identifier: MIT

//! `fork` (§4.9): the entry to N parallel `path` branches, fanned out
//! through a bounded pool. Each branch is just a `path` node re-entering
//! the ordinary lifecycle — `fork` itself only sizes the branches against
//! the configured limits, launches them, and aggregates their recorded
//! outputs.

use crate::errors::ExecutionError;
use crate::executor::{run_node, Engine, ExecutionInputs, NodeExecutor};
use crate::executors::subgraph::downstream_not_crossing_fork_branch;
use crate::model::EdgeType;
use crate::observability::messages::control_flow::ForkLaunched;
use crate::observability::messages::StructuredLog;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const FORK_DEFAULT_MAX_NODES_PER_PATH: u64 = 50;
const FORK_DEFAULT_MAX_TOTAL_NODES: u64 = 200;
const FORK_DEFAULT_MAX_WORKERS: usize = 10;
const FORK_DEFAULT_TIMEOUT_SECS: u64 = 12 * 60 * 60;

pub struct ForkExecutor;

#[async_trait]
impl NodeExecutor for ForkExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, engine: &Engine) -> Result<Value, ExecutionError> {
        let path_ids: Vec<String> = engine
            .workflow
            .outgoing_edges(&inputs.node_id)
            .filter(|e| e.edge_type == EdgeType::ForkBranch)
            .map(|e| e.target.clone())
            .collect();

        let max_per_path = inputs.config_get("max_nodes_per_path").and_then(Value::as_u64).unwrap_or(FORK_DEFAULT_MAX_NODES_PER_PATH);
        let max_total = inputs.config_get("max_total_nodes").and_then(Value::as_u64).unwrap_or(FORK_DEFAULT_MAX_TOTAL_NODES);
        let wait_for_completion = inputs.config_get("wait_for_completion").and_then(Value::as_bool).unwrap_or(true);
        let max_workers = inputs.config_get("max_workers").and_then(Value::as_u64).map(|v| v as usize).unwrap_or(FORK_DEFAULT_MAX_WORKERS);
        let timeout_secs = inputs.config_get("timeout").and_then(Value::as_u64).unwrap_or(FORK_DEFAULT_TIMEOUT_SECS);

        let mut total_downstream = 0u64;
        let mut per_path_nodes = Vec::with_capacity(path_ids.len());
        for path_id in &path_ids {
            let nodes = downstream_not_crossing_fork_branch(engine, path_id);
            if nodes.len() as u64 > max_per_path {
                return Err(ExecutionError::ForkLimitExceeded {
                    fork_id: inputs.node_id.clone(),
                    detail: format!("path '{path_id}' has {} downstream node(s), exceeding max_nodes_per_path={max_per_path}", nodes.len()),
                });
            }
            total_downstream += nodes.len() as u64;
            per_path_nodes.push((path_id.clone(), nodes));
        }
        if total_downstream > max_total {
            return Err(ExecutionError::ForkLimitExceeded {
                fork_id: inputs.node_id.clone(),
                detail: format!("{total_downstream} total downstream node(s) exceed max_total_nodes={max_total}"),
            });
        }

        ForkLaunched { fork_id: &inputs.node_id, total_paths: path_ids.len(), wait_for_completion }.log();

        if !wait_for_completion {
            for (path_id, _) in per_path_nodes {
                let engine = engine.clone();
                tokio::spawn(async move {
                    if let Some(node) = engine.node(&path_id) {
                        let _ = run_node(&engine, &node).await;
                    }
                });
            }
            return Ok(json!({
                "type": "fork",
                "total_paths": path_ids.len(),
                "paths_executed": 0,
                "paths": {},
                "status": "started_in_background",
            }));
        }

        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut set = JoinSet::new();
        for (path_id, nodes) in per_path_nodes {
            let engine = engine.clone();
            let semaphore = semaphore.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                let result = run_one_path(&engine, &path_id).await;
                (path_id, nodes, result)
            });
        }

        let timeout = Duration::from_secs(timeout_secs);
        let drained = tokio::time::timeout(timeout, async {
            let mut out = Vec::new();
            while let Some(joined) = set.join_next().await {
                out.push(joined);
            }
            out
        })
        .await;

        let joined_results = match drained {
            Ok(results) => results,
            Err(_) => {
                set.abort_all();
                return Err(ExecutionError::LevelTimeout { scope: format!("fork '{}'", inputs.node_id), timeout_secs });
            }
        };

        let mut paths_executed = 0usize;
        let mut paths_obj = Map::new();
        for joined in joined_results {
            let (path_id, nodes, result) = joined.map_err(|join_err| ExecutionError::Internal {
                message: format!("fork '{}' path task panicked: {join_err}", inputs.node_id),
            })?;

            let (status, condition_met) = match result {
                Ok(condition_met) => {
                    paths_executed += 1;
                    ("completed".to_string(), condition_met)
                }
                Err(_) => ("failed".to_string(), false),
            };

            let mut nodes_obj = Map::new();
            for node_id in &nodes {
                if node_id == &path_id {
                    continue;
                }
                let state = engine.coordinator.get_node_state(node_id).await;
                let output = engine.coordinator.get_node_output(node_id).await.unwrap_or(Value::Null);
                let status_str = match state {
                    Some(crate::model::NodeState::Success) => "success",
                    Some(crate::model::NodeState::Failed) => "failed",
                    Some(crate::model::NodeState::Skipped) => "skipped",
                    _ => "pending",
                };
                nodes_obj.insert(node_id.clone(), json!({ "status": status_str, "output": output }));
            }

            paths_obj.insert(path_id, json!({ "condition_met": condition_met, "status": status, "nodes": nodes_obj }));
        }

        Ok(json!({
            "type": "fork",
            "total_paths": path_ids.len(),
            "paths_executed": paths_executed,
            "paths": paths_obj,
        }))
    }
}

async fn run_one_path(engine: &Engine, path_id: &str) -> Result<bool, ExecutionError> {
    let node = engine
        .node(path_id)
        .ok_or_else(|| ExecutionError::Internal { message: format!("fork references unknown path '{path_id}'") })?;
    run_node(engine, &node).await?;
    let output = engine.coordinator.get_node_output(path_id).await.unwrap_or(Value::Null);
    Ok(output.get("condition_met").and_then(Value::as_bool).unwrap_or(false))
}
