// SPDX-License-Identifier: MIT

//! `formation` (SPEC_FULL §B): same shape as `data_transform`, keyed
//! `template`/`rendered` instead of `expression`/`result` — the context's
//! generic config evaluation (§4.3) already ran the full template engine
//! over `config.template` before this executor ever sees it.

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct FormationExecutor;

#[async_trait]
impl NodeExecutor for FormationExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        let rendered = inputs.config_get("template").cloned().unwrap_or(Value::Null);
        Ok(json!({ "rendered": rendered }))
    }
}
