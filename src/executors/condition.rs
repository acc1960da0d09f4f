// SPDX-License-Identifier: MIT

//! `condition` (§4.9): evaluates `config.expression`, then in
//! post-execution marks the non-taken `condition` branch skipped — except
//! for any node also reachable through the taken branch (a later `join`
//! fed by both arms of a diamond must not be skipped).

use crate::errors::ExecutionError;
use crate::executor::{mark_node_skipped, Engine, ExecutionInputs, NodeExecutor};
use crate::executors::util::eval_bool;
use crate::model::{EdgeType, Node};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;

pub struct ConditionExecutor;

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        let result = eval_bool(&inputs.node_id, "expression", inputs.config_get("expression"))?;
        Ok(json!({ "result": result }))
    }

    async fn post_execution(&self, engine: &Engine, node: &Node, outputs: &Value) -> Result<(), ExecutionError> {
        let taken = outputs.get("result").and_then(Value::as_bool).unwrap_or(false);

        let taken_targets: Vec<String> = engine
            .workflow
            .outgoing_edges(&node.id)
            .filter(|e| e.edge_type == EdgeType::Condition && e.condition == Some(taken))
            .map(|e| e.target.clone())
            .collect();
        let not_taken_targets: Vec<String> = engine
            .workflow
            .outgoing_edges(&node.id)
            .filter(|e| e.edge_type == EdgeType::Condition && e.condition == Some(!taken))
            .map(|e| e.target.clone())
            .collect();

        let edges = crate::graph::edge_pairs(&engine.workflow);

        let mut reachable_via_taken: HashSet<String> = HashSet::new();
        for target in &taken_targets {
            reachable_via_taken.extend(crate::graph::reachable_forward(target, &edges));
        }

        let mut to_skip: HashSet<String> = HashSet::new();
        for target in &not_taken_targets {
            to_skip.extend(crate::graph::reachable_forward(target, &edges));
        }

        let mut skip_ids: Vec<&String> = to_skip.difference(&reachable_via_taken).collect();
        skip_ids.sort();
        for id in skip_ids {
            mark_node_skipped(engine, id, "condition_not_met").await;
        }

        Ok(())
    }
}
