// SPDX-License-Identifier: MIT

//! Edge definitions (§3).

use serde::{Deserialize, Serialize};

/// The closed set of edge type tags.
///
/// `Normal` covers both "unlabeled" and an explicit `"normal"` tag, since §3
/// lists them as synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    #[default]
    Normal,
    ForkBranch,
    Success,
    Error,
    Condition,
}

/// A directed dependency between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    /// Only meaningful on `condition` edges: the boolean branch this edge
    /// represents.
    #[serde(default)]
    pub condition: Option<bool>,
}
