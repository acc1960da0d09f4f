// SPDX-License-Identifier: MIT

//! `loop` (§4.9): iterates `config.items` sequentially, installing a loop
//! frame in the context for each index and running the declared child
//! nodes (`config.nodes`) under it before moving on.

use crate::errors::ExecutionError;
use crate::executor::{run_node, Engine, ExecutionInputs, NodeExecutor};
use crate::model::LoopFrame;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub struct LoopExecutor;

#[async_trait]
impl NodeExecutor for LoopExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, engine: &Engine) -> Result<Value, ExecutionError> {
        let items = inputs
            .config_get("items")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| ExecutionError::Internal { message: format!("loop '{}' config.items must be a list", inputs.node_id) })?;
        let alias = inputs.config_str("alias").unwrap_or("item").to_string();
        let child_ids: Vec<String> = inputs
            .config_get("nodes")
            .and_then(Value::as_array)
            .map(|nodes| nodes.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let len = items.len();
        let mut results = Vec::with_capacity(len);

        let outcome: Result<(), ExecutionError> = async {
            for (index, item) in items.into_iter().enumerate() {
                let frame = LoopFrame::new(item.clone(), alias.clone(), index, len);
                engine.coordinator.context().set_loop_frame(&frame).await;

                let mut child_outputs = Map::new();
                for child_id in &child_ids {
                    let child = engine.node(child_id).ok_or_else(|| ExecutionError::Internal {
                        message: format!("loop '{}' references unknown child node '{child_id}'", inputs.node_id),
                    })?;
                    run_node(engine, &child).await?;
                    let output = engine.coordinator.get_node_output(child_id).await.unwrap_or(Value::Null);
                    child_outputs.insert(child_id.clone(), output);
                }

                results.push(json!({ "index": index, "item": item, "outputs": child_outputs }));
            }
            Ok(())
        }
        .await;

        engine.coordinator.context().clear_loop_frame().await;
        outcome?;

        Ok(json!({ "results": results, "total_iterations": len }))
    }
}
