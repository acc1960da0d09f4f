// SPDX-License-Identifier: MIT

//! `action`: the generic opaque work node. §1 only specifies leaf contracts
//! for `start`/`end`/`http_request`/`human_task`; `action` names a type tag
//! in §3's closed set with no further module, so its "effect" is whatever
//! its evaluated config describes — this executor reports that config back
//! as its outputs rather than inventing semantics the source never gave it.

use crate::executor::{Engine, ExecutionInputs, NodeExecutor};
use crate::errors::ExecutionError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ActionExecutor;

#[async_trait]
impl NodeExecutor for ActionExecutor {
    async fn execute(&self, inputs: &ExecutionInputs, _engine: &Engine) -> Result<Value, ExecutionError> {
        Ok(json!({ "config": inputs.config.clone() }))
    }
}
