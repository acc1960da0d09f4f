// SPDX-License-Identifier: MIT

//! The `NodeExecutor` contract (§4.8 step 0 / §4.7).

use super::{Engine, ExecutionInputs};
use crate::errors::ExecutionError;
use crate::model::Node;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One node type's behavior.
///
/// `execute` is meant to be a pure function of its `ExecutionInputs` for
/// every leaf node type (`action`, `http_request`, `data_transform`, ...) —
/// it must not reach into the context or coordinator itself; the lifecycle
/// in [`super::run_node`] has already done every context read it needs
/// before calling in.
///
/// The control-flow family (`condition`, `path`, `fork`, `join`, `parallel`,
/// `loop`) is the deliberate exception: §4.9 has them recursively re-enter
/// the same lifecycle over a subgraph, which means they need the running
/// [`Engine`] handle. They receive it through the same `execute` signature
/// leaf executors simply ignore.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(&self, inputs: &ExecutionInputs, engine: &Engine) -> Result<Value, ExecutionError>;

    /// Extra, non-`config` inputs this node type wants recorded alongside
    /// its evaluated config (e.g. `join` wants its fan-out source outputs).
    async fn additional_inputs(&self, _node: &Node, _engine: &Engine) -> Map<String, Value> {
        Map::new()
    }

    /// Runs after a successful `execute`, before edge routing (§4.8 step 6).
    /// Control-flow executors use this to mark skipped branches; leaf
    /// executors leave the default no-op.
    async fn post_execution(&self, _engine: &Engine, _node: &Node, _outputs: &Value) -> Result<(), ExecutionError> {
        Ok(())
    }
}
