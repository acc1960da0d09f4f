// SPDX-License-Identifier: MIT

//! `join` (§4.9): aggregates the records produced by an upstream `fork` or
//! `parallel` node, named by `config.source`. The shape of "a record" is
//! read off the source's own recorded output rather than tracked
//! separately, since `fork` and `parallel` already persist everything a
//! join needs under their own `type` tag.

use crate::errors::ExecutionError;
use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::observability::messages::control_flow::JoinFallbackWrappedOutput;
use crate::observability::messages::StructuredLog;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub struct JoinExecutor;

/// One path (`fork`) or task (`parallel`) the join is synchronizing on.
struct PathRecord {
    id: String,
    succeeded: bool,
    record: Value,
}

/// One downstream node's own output, regardless of which path/task produced
/// it — the granularity `merge`/`outputs` aggregate at (§4.9).
struct NodeOutput {
    node_id: String,
    succeeded: bool,
    output: Value,
}

#[async_trait]
impl NodeExecutor for JoinExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, engine: &Engine) -> Result<Value, ExecutionError> {
        let source_id = inputs.config_str("source").ok_or_else(|| ExecutionError::Internal {
            message: format!("join '{}' has no 'source' in config", inputs.node_id),
        })?;
        let strategy = inputs.config_str("strategy").unwrap_or("merge").to_string();
        let filter = inputs.config_str("filter").map(str::to_string);

        let source_output = engine.coordinator.get_node_output(source_id).await.unwrap_or(Value::Null);
        let is_known_source = matches!(source_output.get("type").and_then(Value::as_str), Some("fork") | Some("parallel"));

        let paths = collect_path_records(&inputs.node_id, source_id, &source_output);
        let node_outputs = collect_node_outputs(engine, source_id, &source_output).await;

        let paths: Vec<PathRecord> = apply_path_filter(paths, filter.as_deref());
        let node_outputs: Vec<NodeOutput> = apply_node_filter(node_outputs, filter.as_deref());

        let (aggregated, count) = match strategy.as_str() {
            "list" => (Value::Array(paths.iter().map(path_record_with_id).collect()), paths.len()),
            "first" => (paths.first().map(path_record_with_id).unwrap_or(Value::Null), paths.len().min(1)),
            "count" => (json!(paths.len()), paths.len()),
            "outputs" => {
                let list: Vec<Value> = node_outputs
                    .iter()
                    .map(|n| {
                        let mut single = Map::new();
                        single.insert(n.node_id.clone(), n.output.clone());
                        Value::Object(single)
                    })
                    .collect();
                let count = list.len();
                (Value::Array(list), count)
            }
            _ => {
                let mut merged = Map::new();
                for node_output in &node_outputs {
                    merged.insert(node_output.node_id.clone(), node_output.output.clone());
                }
                let count = merged.len();
                (Value::Object(merged), count)
            }
        };

        if !is_known_source {
            JoinFallbackWrappedOutput { join_id: &inputs.node_id, source_id }.log();
        }

        Ok(json!({
            "source": source_id,
            "strategy": strategy,
            "aggregated": aggregated,
            "count": count,
            "status": "completed",
        }))
    }
}

/// Tags a path/task record with the path or task id it came from — `merge`
/// can key by node id well enough on its own, but `list`/`first` return the
/// raw fork/parallel record, which has no id embedded in it otherwise.
fn path_record_with_id(p: &PathRecord) -> Value {
    let mut tagged = Map::new();
    tagged.insert("id".to_string(), Value::String(p.id.clone()));
    if let Some(fields) = p.record.as_object() {
        for (k, v) in fields {
            tagged.insert(k.clone(), v.clone());
        }
    } else {
        tagged.insert("value".to_string(), p.record.clone());
    }
    Value::Object(tagged)
}

fn apply_path_filter(paths: Vec<PathRecord>, filter: Option<&str>) -> Vec<PathRecord> {
    match filter {
        Some("success") => paths.into_iter().filter(|p| p.succeeded).collect(),
        Some("failed") => paths.into_iter().filter(|p| !p.succeeded).collect(),
        _ => paths,
    }
}

fn apply_node_filter(nodes: Vec<NodeOutput>, filter: Option<&str>) -> Vec<NodeOutput> {
    match filter {
        Some("success") => nodes.into_iter().filter(|n| n.succeeded).collect(),
        Some("failed") => nodes.into_iter().filter(|n| !n.succeeded).collect(),
        _ => nodes,
    }
}

/// Path- or task-level records: one entry per `fork` path, or per `parallel`
/// task; falls back to wrapping the whole source output as a single record
/// when `source` isn't a recognized fan-out node (§9 open question 3).
fn collect_path_records(join_id: &str, source_id: &str, source_output: &Value) -> Vec<PathRecord> {
    match source_output.get("type").and_then(Value::as_str) {
        Some("fork") => source_output
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .map(|(path_id, path_record)| PathRecord {
                        id: path_id.clone(),
                        succeeded: path_record.get("status").and_then(Value::as_str) == Some("completed"),
                        record: path_record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        Some("parallel") => source_output
            .get("results")
            .and_then(Value::as_object)
            .map(|results| {
                results
                    .iter()
                    .map(|(task_id, task_record)| PathRecord {
                        id: task_id.clone(),
                        succeeded: task_record.get("status").and_then(Value::as_str) == Some("success"),
                        record: task_record.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        _ => {
            let _ = join_id;
            vec![PathRecord { id: source_id.to_string(), succeeded: true, record: source_output.clone() }]
        }
    }
}

/// Node-level outputs: every downstream node that actually ran, regardless
/// of which path it belonged to — the granularity `merge` and `outputs`
/// need (§4.9 "flat map of node_id → output across all taken paths").
async fn collect_node_outputs(engine: &Engine, source_id: &str, source_output: &Value) -> Vec<NodeOutput> {
    match source_output.get("type").and_then(Value::as_str) {
        Some("fork") => {
            let mut out = Vec::new();
            if let Some(paths) = source_output.get("paths").and_then(Value::as_object) {
                for path_record in paths.values() {
                    if let Some(nodes) = path_record.get("nodes").and_then(Value::as_object) {
                        for (node_id, node_record) in nodes {
                            out.push(NodeOutput {
                                node_id: node_id.clone(),
                                succeeded: node_record.get("status").and_then(Value::as_str) == Some("success"),
                                output: node_record.get("output").cloned().unwrap_or(Value::Null),
                            });
                        }
                    }
                }
            }
            out
        }
        Some("parallel") => {
            let mut out = Vec::new();
            if let Some(results) = source_output.get("results").and_then(Value::as_object) {
                for (task_id, task_record) in results {
                    let succeeded = task_record.get("status").and_then(Value::as_str) == Some("success");
                    let output = engine.coordinator.get_node_output(task_id).await.unwrap_or(Value::Null);
                    out.push(NodeOutput { node_id: task_id.clone(), succeeded, output });
                }
            }
            out
        }
        _ => vec![NodeOutput {
            node_id: source_id.to_string(),
            succeeded: true,
            output: source_output.clone(),
        }],
    }
}
