// SPDX-License-Identifier: MIT

//! `parallel` (§4.9): a synchronization marker with no config of its own.
//! Its `execute` is a no-op; the real work is in `post_execution`, which
//! finds its direct downstream nodes and runs them concurrently, the same
//! way the orchestrator runs a level — just with a pool sized for this one
//! fan-out site rather than the whole run.

use crate::errors::ExecutionError;
use crate::executor::{run_node, Engine, ExecutionInputs, NodeExecutor};
use crate::model::Node;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const PARALLEL_MAX_DOWNSTREAM: usize = 20;
const PARALLEL_DEFAULT_TIMEOUT_SECS: u64 = 12 * 60 * 60;

pub struct ParallelExecutor;

#[async_trait]
impl NodeExecutor for ParallelExecutor {
    async fn execute(&self, _inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        Ok(json!({ "type": "parallel" }))
    }

    async fn post_execution(&self, engine: &Engine, node: &Node, _outputs: &Value) -> Result<(), ExecutionError> {
        let targets: Vec<String> = engine.workflow.outgoing_edges(&node.id).map(|e| e.target.clone()).collect();
        if targets.len() > PARALLEL_MAX_DOWNSTREAM {
            return Err(ExecutionError::NodeExecutionFailed {
                node_id: node.id.clone(),
                message: format!(
                    "parallel '{}' has {} downstream node(s), exceeding the limit of {PARALLEL_MAX_DOWNSTREAM}",
                    node.id,
                    targets.len()
                ),
            });
        }
        if targets.is_empty() {
            record_parallel_output(engine, &node.id, 0, Map::new(), "completed").await;
            return Ok(());
        }

        let config = engine.coordinator.context().evaluate_expression(&node.config).await?;
        let wait_for_completion = config.get("wait_for_completion").and_then(Value::as_bool).unwrap_or(true);
        let timeout_secs = config.get("timeout").and_then(Value::as_u64).unwrap_or(PARALLEL_DEFAULT_TIMEOUT_SECS);

        if !wait_for_completion {
            for target in targets.clone() {
                let engine = engine.clone();
                tokio::spawn(async move {
                    if let Some(child) = engine.node(&target) {
                        let _ = run_node(&engine, &child).await;
                    }
                });
            }
            record_parallel_output(engine, &node.id, targets.len(), Map::new(), "started_in_background").await;
            return Ok(());
        }

        let pool_cap = targets.len().min(PARALLEL_MAX_DOWNSTREAM);
        let semaphore = Arc::new(Semaphore::new(pool_cap.max(1)));
        let mut set = JoinSet::new();
        for target in &targets {
            let engine = engine.clone();
            let semaphore = semaphore.clone();
            let target = target.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                let result = match engine.node(&target) {
                    Some(child) => run_node(&engine, &child).await,
                    None => Err(ExecutionError::Internal { message: format!("parallel references unknown node '{target}'") }),
                };
                (target, result)
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

        let mut results = Map::new();
        match drained {
            Ok(joined_results) => {
                for joined in joined_results {
                    let (target, result) = joined.map_err(|join_err| ExecutionError::Internal {
                        message: format!("parallel '{}' task panicked: {join_err}", node.id),
                    })?;
                    let status = match result {
                        Ok(_) => "success".to_string(),
                        Err(err) => format!("failed: {err}"),
                    };
                    results.insert(target, json!({ "status": status }));
                }
            }
            Err(_) => {
                set.abort_all();
                for target in &targets {
                    results.entry(target.clone()).or_insert_with(|| json!({ "status": "cancelled" }));
                }
                record_parallel_output(engine, &node.id, targets.len(), results, "timed_out").await;
                return Err(ExecutionError::LevelTimeout { scope: format!("parallel '{}'", node.id), timeout_secs });
            }
        }

        record_parallel_output(engine, &node.id, targets.len(), results, "completed").await;
        Ok(())
    }
}

async fn record_parallel_output(engine: &Engine, node_id: &str, total: usize, results: Map<String, Value>, status: &str) {
    let output = json!({ "type": "parallel", "total": total, "status": status, "results": results });
    engine.coordinator.set_node_output(node_id, output).await;
}
