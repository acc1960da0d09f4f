// SPDX-License-Identifier: MIT

//! The `start`/`trigger` entry-point marker. Both type tags share this
//! executor (§3: "`start` and `trigger` are interchangeable entry-point
//! markers").

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::Value;

pub struct StartExecutor;

#[async_trait]
impl NodeExecutor for StartExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        Ok(inputs.config.clone())
    }
}
