// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A directed-acyclic-graph workflow execution engine: validates a
//! declarative workflow definition, derives an execution schedule that
//! exposes maximum parallelism, and drives its nodes through their
//! lifecycles while mediating their access to a shared evaluation context.

pub mod context;
pub mod coordinator;
pub mod errors;
pub mod executor;
pub mod executors;
pub mod expr;
pub mod graph;
pub mod model;
pub mod observability;
pub mod orchestrator;
pub mod template;
pub mod validator;
pub mod workflow;
