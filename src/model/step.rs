// SPDX-License-Identifier: MIT

//! Step records (§3): the context entry written when a node finishes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The record kept for one executed node, indexed by node id in the
/// context's `steps` section.
///
/// Created at first successful (or failed, or skipped) execution and never
/// removed for the lifetime of a run — §3: "Created at first successful
/// execution; updatable."
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StepRecord {
    pub inputs: Value,
    pub outputs: Value,
    pub options: Value,
}

impl StepRecord {
    pub fn success(inputs: Value, outputs: Value) -> Self {
        Self { inputs, outputs, options: Value::Null }
    }

    /// A failed node still gets a step record; §3 says it "records an
    /// `error` sub-object instead of normal outputs."
    pub fn failure(inputs: Value, error_message: impl Into<String>) -> Self {
        Self {
            inputs,
            outputs: serde_json::json!({ "error": error_message.into() }),
            options: Value::Null,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            inputs: Value::Null,
            outputs: serde_json::json!({ "skipped": true, "reason": reason.into() }),
            options: Value::Null,
        }
    }
}
