// SPDX-License-Identifier: MIT

//! Error taxonomy for the workflow engine.
//!
//! Each subsystem gets its own leaf error type, matching the pattern the rest
//! of this crate follows: small, `thiserror`-derived enums that a caller can
//! match on, rather than one monolithic catch-all. See each submodule for the
//! errors that subsystem can raise.

mod execution;
mod expression;
mod graph;
mod template;
mod validation;

pub use execution::ExecutionError;
pub use expression::ExpressionError;
pub use graph::GraphError;
pub use template::TemplateError;
pub use validation::{ValidationError, ValidationIssue};
