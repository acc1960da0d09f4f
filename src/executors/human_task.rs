// SPDX-License-Identifier: MIT

//! `human_task`: §9's "pause" design note — modeled as a distinguished
//! terminal state for the current invocation rather than durable
//! suspension. `execute` reports itself as paused; `post_execution` halts
//! the run so the orchestrator stops scheduling further levels until an
//! external collaborator resumes it out-of-band.

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use crate::model::Node;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct HumanTaskExecutor;

#[async_trait]
impl NodeExecutor for HumanTaskExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        Ok(json!({ "status": "paused", "config": inputs.config.clone() }))
    }

    async fn post_execution(&self, engine: &Engine, node: &Node, _outputs: &Value) -> Result<(), ExecutionError> {
        engine
            .coordinator
            .halt_workflow(format!("human_task '{}' is awaiting external input", node.id))
            .await;
        Ok(())
    }
}
