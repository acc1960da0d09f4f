// SPDX-License-Identifier: MIT

//! The `end` terminal marker: no downstream effect, just an outputs echo of
//! its own (already-evaluated) config.

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::Value;

pub struct EndExecutor;

#[async_trait]
impl NodeExecutor for EndExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        Ok(inputs.config.clone())
    }
}
