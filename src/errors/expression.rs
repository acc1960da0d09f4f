// SPDX-License-Identifier: MIT

//! Errors raised by the safe expression evaluator (§4.5).

use thiserror::Error;

/// `UnsafeExpression` and `ExpressionError` are kept as a single enum with
/// two variant families: rejection at parse time (the AST whitelist doing
/// its job) and failure at evaluation time (e.g. division by zero). Both are
/// "not retriable" per §7 — the input expression will never parse or
/// evaluate differently on a second attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression parsed to a syntactic form outside the whitelist
    /// (attribute access, subscription, name lookup, function call, lambda,
    /// comprehension, import, ...).
    #[error("unsafe expression: {0}")]
    Unsafe(String),

    #[error("expression syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("type error: {0}")]
    TypeError(String),
}
