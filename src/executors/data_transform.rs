// SPDX-License-Identifier: MIT

//! `data_transform` (SPEC_FULL §B): a leaf that packages its already
//! context-evaluated `config.expression` under `result`. The rendering
//! itself happened generically at §4.8 step 3 — there is nothing left for
//! this executor to do but report it under the contract's key.

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct DataTransformExecutor;

#[async_trait]
impl NodeExecutor for DataTransformExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        let result = inputs.config_get("expression").cloned().unwrap_or(Value::Null);
        Ok(json!({ "result": result }))
    }
}
