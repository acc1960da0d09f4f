// SPDX-License-Identifier: MIT

//! Transient run-scoped state (§3): node lifecycle state, loop frames, and
//! skip entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A node's lifecycle state for the current run.
///
/// `Skipped` is modeled as a third terminal state alongside `Success` and
/// `Failed`, per §9's design note ("Semantically, `skipped` is a third
/// terminal state").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl NodeState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, NodeState::Pending | NodeState::Running)
    }
}

/// Why a node was marked skipped, and any supporting detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipEntry {
    pub reason: String,
    pub details: HashMap<String, Value>,
}

impl SkipEntry {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into(), details: HashMap::new() }
    }

    pub fn with_details(reason: impl Into<String>, details: HashMap<String, Value>) -> Self {
        Self { reason: reason.into(), details }
    }
}

/// Transient per-iteration state installed by a `loop` node while its
/// children run (§3). Exists only for the duration of one iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopFrame {
    pub item: Value,
    pub alias: String,
    pub index: usize,
    pub len: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl LoopFrame {
    pub fn new(item: Value, alias: impl Into<String>, index: usize, len: usize) -> Self {
        Self {
            item,
            alias: alias.into(),
            index,
            len,
            is_first: index == 0,
            is_last: index + 1 == len,
        }
    }

    /// Render this frame as the `loop` section of the evaluation context,
    /// including `loop.<alias>` as an alias for `loop.item`.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("item".to_string(), self.item.clone());
        map.insert(self.alias.clone(), self.item.clone());
        map.insert("index".to_string(), Value::from(self.index));
        map.insert("len".to_string(), Value::from(self.len));
        map.insert("is_first".to_string(), Value::from(self.is_first));
        map.insert("is_last".to_string(), Value::from(self.is_last));
        Value::Object(map)
    }
}
