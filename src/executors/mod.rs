// SPDX-License-Identifier: MIT

//! The closed set of node-type executors (§3) and the registry that wires
//! them up (§4.7). `default_registry` is the one place that table is built
//! — there being no Rust equivalent of a module-load registration hook.

mod action;
mod condition;
mod data_transform;
mod end;
mod fork;
mod formation;
mod human_task;
mod http_request;
mod join;
mod loop_exec;
mod parallel;
mod path;
mod start;
mod subgraph;
mod subworkflow;
mod util;

pub use action::ActionExecutor;
pub use condition::ConditionExecutor;
pub use data_transform::DataTransformExecutor;
pub use end::EndExecutor;
pub use fork::ForkExecutor;
pub use formation::FormationExecutor;
pub use http_request::{HttpClient, HttpRequestExecutor, HttpResponse, StubHttpClient};
pub use human_task::HumanTaskExecutor;
pub use join::JoinExecutor;
pub use loop_exec::LoopExecutor;
pub use parallel::ParallelExecutor;
pub use path::PathExecutor;
pub use start::StartExecutor;
pub use subworkflow::SubworkflowExecutor;

use crate::executor::{ExecutorFactory, ExecutorRegistry, NodeExecutor};
use crate::model::{Node, NodeType};
use std::sync::Arc;

/// Lifts a closure into an [`ExecutorFactory`] — the bound on `f`'s return
/// type lets the `Arc<Concrete> -> Arc<dyn NodeExecutor>` coercion happen at
/// each call site instead of needing a manual cast in every registration
/// below.
fn factory(f: impl Fn(&Node) -> Arc<dyn NodeExecutor> + Send + Sync + 'static) -> ExecutorFactory {
    Arc::new(f)
}

/// Builds the registry every [`crate::executor::Engine`] runs against.
/// `start` and `trigger` share one executor (§3); every other type tag gets
/// its own.
pub fn default_registry(http_client: Arc<dyn HttpClient>) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();

    registry.register(NodeType::Start, factory(|_| Arc::new(StartExecutor)));
    registry.register(NodeType::Trigger, factory(|_| Arc::new(StartExecutor)));
    registry.register(NodeType::End, factory(|_| Arc::new(EndExecutor)));
    registry.register(NodeType::Action, factory(|_| Arc::new(ActionExecutor)));
    registry.register(NodeType::Condition, factory(|_| Arc::new(ConditionExecutor)));
    registry.register(NodeType::Loop, factory(|_| Arc::new(LoopExecutor)));
    registry.register(NodeType::Fork, factory(|_| Arc::new(ForkExecutor)));
    registry.register(NodeType::Parallel, factory(|_| Arc::new(ParallelExecutor)));
    registry.register(NodeType::Path, factory(|_| Arc::new(PathExecutor)));
    registry.register(NodeType::Join, factory(|_| Arc::new(JoinExecutor)));
    registry.register(NodeType::Subworkflow, factory(|_| Arc::new(SubworkflowExecutor)));
    registry.register(NodeType::DataTransform, factory(|_| Arc::new(DataTransformExecutor)));
    registry.register(NodeType::Formation, factory(|_| Arc::new(FormationExecutor)));
    registry.register(NodeType::HumanTask, factory(|_| Arc::new(HumanTaskExecutor)));

    let client = http_client.clone();
    registry.register(NodeType::HttpRequest, factory(move |_| Arc::new(HttpRequestExecutor::new(client.clone()))));

    registry
}
