// SPDX-License-Identifier: MIT

//! Node definitions (§3).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The closed set of node type tags a workflow definition may use.
///
/// Unknown tags fail deserialization rather than silently becoming a
/// catch-all variant — §4.2 requires the validator to reject a node whose
/// type is not in this set, and an unrecognized `#[serde(rename_all =
/// "snake_case")]` value does exactly that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Start,
    End,
    Trigger,
    Action,
    Condition,
    Loop,
    Fork,
    Parallel,
    Path,
    Join,
    Subworkflow,
    HttpRequest,
    DataTransform,
    Formation,
    HumanTask,
}

impl NodeType {
    /// `start` and `trigger` are interchangeable entry-point markers — §3
    /// requires "exactly one start/trigger node."
    pub fn is_entry_point(self) -> bool {
        matches!(self, NodeType::Start | NodeType::Trigger)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Trigger => "trigger",
            NodeType::Action => "action",
            NodeType::Condition => "condition",
            NodeType::Loop => "loop",
            NodeType::Fork => "fork",
            NodeType::Parallel => "parallel",
            NodeType::Path => "path",
            NodeType::Join => "join",
            NodeType::Subworkflow => "subworkflow",
            NodeType::HttpRequest => "http_request",
            NodeType::DataTransform => "data_transform",
            NodeType::Formation => "formation",
            NodeType::HumanTask => "human_task",
        }
    }
}

/// Retry policy attached to a node (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub delay_seconds: u64,
}

/// Error-handling policy attached to a node (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandling {
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default)]
    pub on_success: Option<String>,
}

/// A single node in the workflow graph.
///
/// `config` is an opaque JSON object until a node executor evaluates it
/// through the context (§4.3) — it may contain template strings, safe
/// expressions, or plain literals depending on the node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub error_handling: Option<ErrorHandling>,
}

impl Node {
    /// `config` defaults to `Value::Null` when the key was absent entirely —
    /// the validator treats that as the §4.2 "missing config" warning case,
    /// distinct from an explicit empty object.
    pub fn has_config(&self) -> bool {
        !self.config.is_null()
    }

    pub fn config_object(&self) -> serde_json::Map<String, Value> {
        self.config.as_object().cloned().unwrap_or_default()
    }
}

pub type NodeOptions = HashMap<String, Value>;
