// SPDX-License-Identifier: MIT

//! The prepared, post-template-evaluation view of a node an executor's
//! `execute` actually sees (§4.8 step 3).

use crate::model::NodeType;
use serde_json::{Map, Value};

/// Everything a `NodeExecutor::execute` needs, already evaluated against the
/// context (`config`) plus whatever a control-flow parent injected (`extra`
/// — e.g. the fork branch's own node subset, or a loop iteration's frame).
#[derive(Debug, Clone)]
pub struct ExecutionInputs {
    pub node_id: String,
    pub node_type: NodeType,
    pub name: String,
    pub config: Value,
    pub extra: Map<String, Value>,
}

impl ExecutionInputs {
    pub fn new(node_id: impl Into<String>, node_type: NodeType, name: impl Into<String>, config: Value) -> Self {
        Self { node_id: node_id.into(), node_type, name: name.into(), config, extra: Map::new() }
    }

    /// A JSON object combining `config` and `extra`, written verbatim into
    /// the node's step record as `inputs` (§3).
    pub fn to_value(&self) -> Value {
        let mut map = self.config.as_object().cloned().unwrap_or_else(|| {
            let mut m = Map::new();
            if !self.config.is_null() {
                m.insert("value".to_string(), self.config.clone());
            }
            m
        });
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    pub fn config_get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}
