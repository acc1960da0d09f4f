// SPDX-License-Identifier: MIT

//! The workflow orchestrator (§4.10): validates a definition, computes its
//! dependency levels, and drives them to completion one level at a time
//! through the shared node lifecycle. Never throws to its caller — every
//! outcome, success or failure, comes back as the run-result JSON shape
//! described in §6.

use crate::context::EvaluationContext;
use crate::coordinator::Coordinator;
use crate::errors::ExecutionError;
use crate::executor::{run_levels, Engine, ExecutorRegistry};
use crate::graph::{assign_levels, edge_pairs, DependencyGraph};
use crate::model::{NodeState, WorkflowDefinition};
use crate::observability::messages::orchestrator::{LevelsComputed, RunCompleted, RunFailed, RunStarted};
use crate::observability::messages::StructuredLog;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Runs `workflow` to completion and returns the run-result shape (§6):
/// `{status:"completed", execution_order}` or `{status:"failed", error,
/// execution_order, completed_nodes}`. Validation failure short-circuits
/// with the same failed shape, `node_id: null`.
pub async fn execute(
    workflow: WorkflowDefinition,
    registry: Arc<ExecutorRegistry>,
    cancellation: Option<CancellationToken>,
) -> Value {
    let started_at = Instant::now();
    let workflow = Arc::new(workflow);

    RunStarted { workflow_id: &workflow.id, node_count: workflow.nodes.len(), edge_count: workflow.edges.len() }.log();

    if let Err(validation_err) = crate::validator::validate_workflow(&workflow) {
        return failed_response(
            &workflow.id,
            "ValidationFailed",
            validation_err.to_string(),
            None,
            Vec::new(),
            Vec::new(),
        );
    }

    let context = EvaluationContext::new();
    context.seed(seed_variables(&workflow), seed_system(&workflow)).await;
    let coordinator = Coordinator::new(context);
    let engine = Engine::new(workflow.clone(), coordinator, registry, cancellation);

    // §4.9: a `loop`'s declared children run only under the loop's own
    // sequential re-entry, once per iteration, with a loop frame the
    // top-level schedule never installs. They carry no real edge into them,
    // so excluded here, they'd otherwise get their own level-0 slot and run
    // once, unconditionally, before the loop that owns them ever started.
    let loop_owned: std::collections::HashSet<String> =
        crate::graph::loop_child_pairs(&workflow).into_iter().map(|(_, child)| child).collect();
    let scheduled_ids: Vec<&str> =
        workflow.nodes.iter().map(|n| n.id.as_str()).filter(|id| !loop_owned.contains(*id)).collect();
    let edges: Vec<(String, String)> = edge_pairs(&workflow)
        .into_iter()
        .filter(|(source, target)| !loop_owned.contains(source) && !loop_owned.contains(target))
        .collect();
    let graph = DependencyGraph::from_ids_and_edges(scheduled_ids, &edges);
    let (_by_id, grouped) = match assign_levels(&graph, &edges) {
        Ok(result) => result,
        Err(graph_err) => {
            return failed_response(&workflow.id, "CycleDetected", graph_err.to_string(), None, Vec::new(), Vec::new())
        }
    };
    LevelsComputed { level_count: grouped.len(), node_count: workflow.nodes.len() }.log();

    let level_timeout = Duration::from_secs(workflow.config.level_timeout_secs());
    let orchestrator_pool_cap = grouped.iter().map(Vec::len).max().unwrap_or(1).min(10);

    let result = match run_levels(&engine, &grouped, orchestrator_pool_cap, level_timeout).await {
        Ok(execution_order) => {
            RunCompleted { workflow_id: &workflow.id, duration: started_at.elapsed() }.log();
            json!({ "status": "completed", "execution_order": execution_order })
        }
        Err(err) => {
            let (execution_order, completed_nodes) = collect_progress(&engine, &grouped).await;
            let node_id = first_failed_node(&engine, &grouped).await;
            RunFailed { workflow_id: &workflow.id, node_id: node_id.as_deref(), message: &err.to_string() }.log();
            failed_response(&workflow.id, error_type(&err), err.to_string(), node_id, execution_order, completed_nodes)
        }
    };

    attach_run_summary(result, &workflow, &engine).await
}

/// §B "Structured run summary": beyond the bare status shape, exposes the
/// advisory top-level `timeout`, the full event log, and the skip registry —
/// pure read surface over state the coordinator already keeps.
async fn attach_run_summary(mut result: Value, workflow: &WorkflowDefinition, engine: &Engine) -> Value {
    let events = engine.coordinator.get_events(None).await;
    let skip_registry = engine.coordinator.skip_registry_snapshot().await;
    let steps = engine.coordinator.context().get_section(crate::context::Section::Steps).await;

    if let Value::Object(map) = &mut result {
        map.insert(
            "metadata".to_string(),
            json!({
                "timeout": workflow.config.timeout,
                "events": events,
                "skip_registry": skip_registry,
                "steps": steps,
            }),
        );
    }
    result
}

fn error_type(err: &ExecutionError) -> &'static str {
    match err {
        ExecutionError::UnknownNodeType(_) => "UnknownNodeType",
        ExecutionError::NodeExecutionFailed { .. } => "NodeExecutionFailed",
        ExecutionError::LevelTimeout { .. } => "LevelTimeout",
        ExecutionError::ForkLimitExceeded { .. } => "ForkLimitExceeded",
        ExecutionError::WorkflowHalted(_) => "WorkflowHalted",
        ExecutionError::Internal { .. } => "InternalError",
        ExecutionError::Template(_) => "TemplateError",
        ExecutionError::Expression(_) => "ExpressionError",
    }
}

fn failed_response(
    workflow_id: &str,
    error_type: &str,
    message: String,
    node_id: Option<String>,
    execution_order: Vec<String>,
    completed_nodes: Vec<String>,
) -> Value {
    let _ = workflow_id;
    json!({
        "status": "failed",
        "error": {
            "type": error_type,
            "message": message,
            "node_id": node_id,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        },
        "execution_order": execution_order,
        "completed_nodes": completed_nodes,
    })
}

/// Node ids whose lifecycle reached a terminal state, in level order — the
/// best approximation of "what ran" available once a run has bailed out
/// partway through (§4.10 step 7's `execution_order`/`completed_nodes`).
async fn collect_progress(engine: &Engine, grouped: &[Vec<String>]) -> (Vec<String>, Vec<String>) {
    let mut execution_order = Vec::new();
    let mut completed_nodes = Vec::new();
    for level in grouped {
        for node_id in level {
            if let Some(state) = engine.coordinator.get_node_state(node_id).await {
                if state.is_terminal() {
                    execution_order.push(node_id.clone());
                    if state == NodeState::Success {
                        completed_nodes.push(node_id.clone());
                    }
                }
            }
        }
    }
    (execution_order, completed_nodes)
}

/// The first node in level order that ended up `Failed` — the orchestrator's
/// best record of "which node failed first" (§4.10).
async fn first_failed_node(engine: &Engine, grouped: &[Vec<String>]) -> Option<String> {
    for level in grouped {
        for node_id in level {
            if engine.coordinator.get_node_state(node_id).await == Some(NodeState::Failed) {
                return Some(node_id.clone());
            }
        }
    }
    None
}

fn seed_variables(workflow: &WorkflowDefinition) -> Map<String, Value> {
    workflow.variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn seed_system(workflow: &WorkflowDefinition) -> Map<String, Value> {
    let mut system = Map::new();
    system.insert("run_id".to_string(), json!(uuid::Uuid::new_v4().to_string()));
    system.insert("workflow_id".to_string(), json!(workflow.id));
    system.insert("workflow_name".to_string(), json!(workflow.name));
    system.insert("workflow_version".to_string(), json!(workflow.version));
    system.insert("started_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    system.insert("node_count".to_string(), json!(workflow.nodes.len()));
    system.insert("edge_count".to_string(), json!(workflow.edges.len()));
    system
}
