// SPDX-License-Identifier: MIT

//! The node lifecycle state machine (§4.8) and the bounded-pool,
//! level-by-level driver (§4.10) it runs under — shared by the top-level
//! orchestrator and by every control-flow executor that re-enters execution
//! over a subgraph (§4.9).

use super::{Engine, ExecutionInputs};
use crate::errors::ExecutionError;
use crate::model::{Edge, EdgeType, EventType, Node, NodeState, SkipEntry, StepRecord};
use crate::observability::messages::node::{NodeCompleted, NodeFailed, NodeRetryFailed, NodeSkipped, NodeStarted};
use crate::observability::messages::orchestrator::{HaltObserved, LevelStarted, LevelTimedOut};
use crate::observability::messages::StructuredLog;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Runs one node through its full lifecycle: skip check, input preparation,
/// execute-with-retry, success/failure recording, the post-execution hook,
/// and edge routing.
///
/// Returns the node's terminal [`NodeState`] on anything the routing rules
/// absorbed (success, skip, or a routed/`continue_on_error` failure); returns
/// `Err` only when the failure has nowhere to go and must bubble to the
/// caller's own failure handling (§7 "Propagation policy").
pub async fn run_node(engine: &Engine, node: &Node) -> Result<NodeState, ExecutionError> {
    let coordinator = &engine.coordinator;

    let (skipped, entry) = coordinator.is_node_skipped(&node.id).await;
    if skipped {
        let reason = entry.map(|e| e.reason).unwrap_or_else(|| "skipped".to_string());
        coordinator.set_node_step(&node.id, StepRecord::skipped(reason.clone())).await;
        coordinator
            .record_event(EventType::NodeSkipped, Some(node.id.clone()), json!({ "reason": reason }))
            .await;
        NodeSkipped { node_id: &node.id, reason: &reason }.log();
        return Ok(NodeState::Skipped);
    }

    coordinator.set_node_state(&node.id, NodeState::Running).await;
    coordinator
        .record_event(EventType::NodeStarted, Some(node.id.clone()), json!({ "node_type": node.node_type.as_str() }))
        .await;
    NodeStarted { node_id: &node.id, node_type: node.node_type.as_str() }.log();
    let started_at = Instant::now();

    let evaluated_config = coordinator.context().evaluate_expression(&node.config).await?;
    let executor = engine.registry.create_executor(node)?;
    let extra = executor.additional_inputs(node, engine).await;
    let inputs = ExecutionInputs {
        node_id: node.id.clone(),
        node_type: node.node_type,
        name: node.name.clone(),
        config: evaluated_config,
        extra,
    };
    coordinator.set_node_input(&node.id, inputs.to_value()).await;

    let retry = node.retry.unwrap_or_default();
    let mut attempt = 0u32;
    let outcome = loop {
        match executor.execute(&inputs, engine).await {
            Ok(value) => break Ok(value),
            Err(err) if attempt < retry.max_retries => {
                attempt += 1;
                coordinator
                    .record_event(
                        EventType::NodeRetryFailed,
                        Some(node.id.clone()),
                        json!({ "attempt": attempt, "max_retries": retry.max_retries, "error": err.to_string() }),
                    )
                    .await;
                NodeRetryFailed { node_id: &node.id, attempt, max_retries: retry.max_retries, error: &err.to_string() }
                    .log();
                if retry.delay_seconds > 0 {
                    tokio::time::sleep(Duration::from_secs(retry.delay_seconds)).await;
                }
            }
            Err(err) => break Err(err),
        }
    };

    match outcome {
        Ok(outputs) => {
            coordinator.set_node_step(&node.id, StepRecord::success(inputs.to_value(), outputs.clone())).await;
            coordinator.set_node_state(&node.id, NodeState::Success).await;
            let duration_ms = started_at.elapsed().as_millis() as u64;
            coordinator
                .record_event(EventType::NodeCompleted, Some(node.id.clone()), json!({ "duration_ms": duration_ms }))
                .await;
            NodeCompleted { node_id: &node.id, duration: started_at.elapsed() }.log();

            // §B "Run-level metadata surface": diagnostic timing, independent of
            // the node's own typed outputs, stashed under its own key.
            coordinator
                .context()
                .update(
                    crate::context::Section::Metadata,
                    [(node.id.clone(), json!({ "duration_ms": duration_ms, "attempts": attempt }))].into_iter().collect(),
                )
                .await;

            executor.post_execution(engine, node, &outputs).await?;
            route_on_success(engine, node).await;
            Ok(NodeState::Success)
        }
        Err(err) => handle_failure(engine, node, &inputs, err).await,
    }
}

/// §4.8 step 7/8 + §7: a failure that has an error edge, or a success edge
/// it can instead fall through to, is absorbed and the workflow keeps going
/// down whichever path is actually reachable; `continue_on_error` absorbs a
/// failure with nowhere to route; anything else bubbles up.
async fn handle_failure(
    engine: &Engine,
    node: &Node,
    inputs: &ExecutionInputs,
    err: ExecutionError,
) -> Result<NodeState, ExecutionError> {
    let coordinator = &engine.coordinator;
    let message = err.to_string();

    coordinator.set_node_step(&node.id, StepRecord::failure(inputs.to_value(), message.clone())).await;
    coordinator.set_node_state(&node.id, NodeState::Failed).await;
    coordinator
        .record_event(EventType::NodeFailed, Some(node.id.clone()), json!({ "error": message.clone() }))
        .await;
    NodeFailed { node_id: &node.id, error: &message }.log();

    let has_error_edges = engine.workflow.outgoing_edges(&node.id).any(|e| e.edge_type == EdgeType::Error);
    let has_success_edges = engine.workflow.outgoing_edges(&node.id).any(|e| e.edge_type == EdgeType::Success);

    if has_error_edges || has_success_edges {
        for edge in engine.workflow.outgoing_edges(&node.id).filter(|e| e.edge_type == EdgeType::Success) {
            mark_node_skipped(engine, &edge.target, "success_edge_not_taken").await;
        }
        return Ok(NodeState::Failed);
    }

    let continue_on_error = node.error_handling.as_ref().is_some_and(|h| h.continue_on_error);
    if continue_on_error {
        return Ok(NodeState::Failed);
    }

    Err(ExecutionError::NodeExecutionFailed { node_id: node.id.clone(), message })
}

/// §4.8 step 7: a node that completes successfully and has error-typed
/// outgoing edges routes away from them — they were the failure path, and
/// it didn't fail.
async fn route_on_success(engine: &Engine, node: &Node) {
    let has_error_edges = engine.workflow.outgoing_edges(&node.id).any(|e| e.edge_type == EdgeType::Error);
    if !has_error_edges {
        return;
    }
    let targets: Vec<String> = engine
        .workflow
        .outgoing_edges(&node.id)
        .filter(|e| e.edge_type == EdgeType::Error)
        .map(|e| e.target.clone())
        .collect();
    for target in targets {
        mark_node_skipped(engine, &target, "error_edge_not_taken").await;
    }
}

/// Marks a node skipped and records the corresponding event — the one
/// primitive every control-flow executor uses to prune a branch it decided
/// not to take (§4.9).
pub async fn mark_node_skipped(engine: &Engine, node_id: &str, reason: &str) {
    engine.coordinator.mark_node_skipped(node_id, SkipEntry::new(reason)).await;
    engine
        .coordinator
        .record_event(EventType::NodeSkipped, Some(node_id.to_string()), json!({ "reason": reason }))
        .await;
    NodeSkipped { node_id, reason }.log();
}

/// Undoes a skip mark left by an independent decision point once another of
/// the node's incoming edges turns out to still be live (§4.9: a diamond fed
/// by two separate `condition` nodes must not drop the target just because
/// one of the two took the other branch). Two condition nodes gating the
/// same downstream target run concurrently within a level and can't see each
/// other's outcome from inside their own `post_execution`, so this runs once
/// per level boundary, by which point every earlier level's decisions are
/// final (§5 "between levels: strict happens-before").
async fn reconcile_skips(engine: &Engine, level: &[String]) {
    for node_id in level {
        let (skipped, _) = engine.coordinator.is_node_skipped(node_id).await;
        if !skipped {
            continue;
        }
        let incoming: Vec<Edge> = engine.workflow.incoming_edges(node_id).cloned().collect();
        let mut has_live_edge = false;
        for edge in &incoming {
            if is_alive_edge(engine, edge).await {
                has_live_edge = true;
                break;
            }
        }
        if has_live_edge {
            engine.coordinator.unmark_node_skipped(node_id).await;
        }
    }
}

/// Whether `edge` still offers a live path into its target, given its
/// source's recorded terminal decision.
async fn is_alive_edge(engine: &Engine, edge: &Edge) -> bool {
    let source_state = engine.coordinator.get_node_state(&edge.source).await;
    match edge.edge_type {
        EdgeType::Condition => {
            if source_state != Some(NodeState::Success) {
                return false;
            }
            let taken = engine
                .coordinator
                .get_node_output(&edge.source)
                .await
                .and_then(|o| o.get("result").or_else(|| o.get("condition_met")).and_then(serde_json::Value::as_bool));
            taken == edge.condition
        }
        EdgeType::Success => source_state == Some(NodeState::Success),
        EdgeType::Error => source_state == Some(NodeState::Failed),
        EdgeType::ForkBranch | EdgeType::Normal => source_state == Some(NodeState::Success),
    }
}

/// `run_levels`'s own dispatch of [`run_node`] — distinct from `loop`'s and
/// `fork`'s direct calls to it, which deliberately re-enter a node on
/// purpose (once per loop iteration; once per forked path). A node reached
/// by two independent level-by-level drivers over the *same* static graph —
/// the top-level run and a `path`'s own nested re-entry over its taken
/// subgraph, both walking ordinary edges — is not a deliberate re-entry, so
/// a node already left in a terminal state by the first driver to reach it
/// is a no-op for the second (§5 "between levels: strict happens-before").
async fn run_node_once(engine: &Engine, node: &Node) -> Result<NodeState, ExecutionError> {
    if let Some(state) = engine.coordinator.get_node_state(&node.id).await {
        if state.is_terminal() {
            return Ok(state);
        }
    }
    run_node(engine, node).await
}

/// Drives `levels` to completion: one level at a time, a bounded worker pool
/// within each level (single-node levels bypass the pool), a per-level
/// timeout, and a halt check between levels (§4.10).
///
/// Returns the node ids in the order their lifecycle ran — including
/// skipped nodes, since skip is itself a terminal outcome of that lifecycle,
/// not an absence from it.
pub async fn run_levels(
    engine: &Engine,
    levels: &[Vec<String>],
    pool_cap: usize,
    level_timeout: Duration,
) -> Result<Vec<String>, ExecutionError> {
    let mut order = Vec::new();

    for (level_index, level) in levels.iter().enumerate() {
        if level.is_empty() {
            continue;
        }

        if engine.is_cancelled() {
            return Err(ExecutionError::WorkflowHalted("cancellation token was triggered".to_string()));
        }

        reconcile_skips(engine, level).await;

        LevelStarted { level: level_index, node_count: level.len() }.log();

        if level.len() == 1 {
            let node = resolve_node(engine, &level[0])?;
            match tokio::time::timeout(level_timeout, run_node_once(engine, &node)).await {
                Ok(result) => {
                    result?;
                }
                Err(_) => {
                    LevelTimedOut { level: level_index, timeout_secs: level_timeout.as_secs() }.log();
                    return Err(ExecutionError::LevelTimeout {
                        scope: format!("level {level_index}"),
                        timeout_secs: level_timeout.as_secs(),
                    });
                }
            }
        } else {
            let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(pool_cap.max(1)));
            let mut set = JoinSet::new();
            for node_id in level {
                let node = resolve_node(engine, node_id)?;
                let engine = engine.clone();
                let semaphore = semaphore.clone();
                set.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                    run_node_once(&engine, &node).await
                });
            }

            let drained = tokio::time::timeout(level_timeout, async {
                let mut results = Vec::new();
                while let Some(joined) = set.join_next().await {
                    results.push(joined);
                }
                results
            })
            .await;

            match drained {
                Ok(results) => {
                    for joined in results {
                        match joined {
                            Ok(Ok(_)) => {}
                            Ok(Err(execution_err)) => return Err(execution_err),
                            Err(join_err) => {
                                return Err(ExecutionError::Internal { message: format!("node task panicked: {join_err}") })
                            }
                        }
                    }
                }
                Err(_) => {
                    set.abort_all();
                    LevelTimedOut { level: level_index, timeout_secs: level_timeout.as_secs() }.log();
                    return Err(ExecutionError::LevelTimeout {
                        scope: format!("level {level_index}"),
                        timeout_secs: level_timeout.as_secs(),
                    });
                }
            }
        }

        order.extend(level.iter().cloned());

        if engine.coordinator.should_halt().await {
            let reason = engine.coordinator.halt_reason().await.unwrap_or_default();
            HaltObserved { reason: &reason }.log();
            return Err(ExecutionError::WorkflowHalted(reason));
        }
    }

    Ok(order)
}

fn resolve_node(engine: &Engine, node_id: &str) -> Result<Node, ExecutionError> {
    engine
        .node(node_id)
        .ok_or_else(|| ExecutionError::Internal { message: format!("level referenced unknown node '{node_id}'") })
}
