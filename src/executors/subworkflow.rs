// SPDX-License-Identifier: MIT

//! `subworkflow` (SPEC_FULL §B): runs an embedded [`WorkflowDefinition`]
//! through a fresh, nested orchestrator run sharing no mutable state with
//! the parent beyond its own evaluated inputs, and returns that run's
//! result shape as its output. A failed nested run surfaces as an ordinary
//! `NodeExecutionFailed`, subject to the same retry/routing rules as any
//! other node.

use crate::errors::ExecutionError;
use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::model::WorkflowDefinition;
use async_trait::async_trait;
use serde_json::Value;

pub struct SubworkflowExecutor;

#[async_trait]
impl NodeExecutor for SubworkflowExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, engine: &Engine) -> Result<Value, ExecutionError> {
        let mut definition: WorkflowDefinition = match inputs.config_get("workflow") {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| ExecutionError::Internal {
                message: format!("subworkflow '{}': invalid embedded definition: {e}", inputs.node_id),
            })?,
            None => {
                return Err(ExecutionError::Internal {
                    message: format!("subworkflow '{}' has no 'workflow' in config", inputs.node_id),
                })
            }
        };

        if let Some(overlay) = inputs.config_get("variables").and_then(Value::as_object) {
            for (key, value) in overlay {
                definition.variables.insert(key.clone(), value.clone());
            }
        }

        let run_result = crate::orchestrator::execute(definition, engine.registry.clone(), None).await;

        if run_result.get("status").and_then(Value::as_str) == Some("failed") {
            let message = run_result
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("subworkflow run failed")
                .to_string();
            return Err(ExecutionError::NodeExecutionFailed { node_id: inputs.node_id.clone(), message });
        }

        Ok(run_result)
    }
}
