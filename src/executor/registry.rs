// SPDX-License-Identifier: MIT

//! The type-tag → executor-factory table (§4.7).
//!
//! Nothing here runs at module load; Rust has no init-hook equivalent to
//! lean on, so the table is built explicitly by whoever constructs an
//! [`Engine`] (the orchestrator, or a test), by calling
//! [`crate::executors::default_registry`].

use super::NodeExecutor;
use crate::errors::ExecutionError;
use crate::model::{Node, NodeType};
use std::collections::HashMap;
use std::sync::Arc;

/// A factory builds one `NodeExecutor` per node, so a type tag's behavior
/// can depend on that node's own config (e.g. a `loop` executor closing over
/// its `body` node ids).
pub type ExecutorFactory = Arc<dyn Fn(&Node) -> Arc<dyn NodeExecutor> + Send + Sync>;

#[derive(Default)]
pub struct ExecutorRegistry {
    factories: HashMap<NodeType, ExecutorFactory>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node_type: NodeType, factory: ExecutorFactory) {
        self.factories.insert(node_type, factory);
    }

    pub fn create_executor(&self, node: &Node) -> Result<Arc<dyn NodeExecutor>, ExecutionError> {
        self.factories
            .get(&node.node_type)
            .map(|factory| factory(node))
            .ok_or_else(|| ExecutionError::UnknownNodeType(node.node_type.as_str().to_string()))
    }
}
