// SPDX-License-Identifier: MIT

//! Errors raised by the template engine (§4.4).

use thiserror::Error;

/// Template rendering failures. Undefined-variable errors are the common
/// case by design — §4.4 forbids silent empty-string substitution, so every
/// lookup miss must surface here with enough context (the available sibling
/// keys) for a workflow author to fix their template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("undefined variable '{path}'; available keys at this level: [{}]", available.join(", "))]
    UndefinedVariable { path: String, available: Vec<String> },

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("filter '{filter}' received invalid argument(s): {message}")]
    InvalidFilterArgument { filter: String, message: String },

    #[error("template syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unclosed block '{0}'")]
    UnclosedBlock(String),

    #[error("cannot index into non-collection value with '{0}'")]
    NotIndexable(String),

    #[error("type error: {0}")]
    TypeError(String),
}
