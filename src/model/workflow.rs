// SPDX-License-Identifier: MIT

//! The workflow definition itself (§3, §6).

use super::{Edge, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Top-level run configuration (§3: "optional top-level config (`timeout`,
/// `level_timeout`)").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunConfig {
    /// Advisory whole-run deadline in seconds. Per SPEC_FULL §C.2, only
    /// `level_timeout` is actually enforced; this is stored and surfaced in
    /// the run result's metadata.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Per-level deadline in seconds, default 24h (§4.10).
    #[serde(default)]
    pub level_timeout: Option<u64>,
}

impl RunConfig {
    pub const DEFAULT_LEVEL_TIMEOUT_SECS: u64 = 24 * 60 * 60;

    pub fn level_timeout_secs(&self) -> u64 {
        self.level_timeout.unwrap_or(Self::DEFAULT_LEVEL_TIMEOUT_SECS)
    }
}

/// A complete, immutable-during-run workflow definition (§3, wire shape §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub config: RunConfig,
    #[serde(default)]
    pub user: Option<Value>,
}

impl WorkflowDefinition {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Parse from the JSON wire format (§6).
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Parse from a YAML document, following the teacher crate's convention
    /// of accepting YAML as an operator-ergonomics alternative to JSON.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
