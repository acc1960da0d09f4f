// SPDX-License-Identifier: MIT

//! Small helpers shared across the leaf and control-flow executors.

use crate::errors::ExecutionError;
use serde_json::Value;

/// Resolves a `condition`/`expression`/`path.condition` config value to a
/// boolean. A literal `bool` passes straight through; a string is handed to
/// the safe expression evaluator (§4.5) — by the time an executor sees it,
/// the node-lifecycle's template pass (§4.8 step 3) has already substituted
/// any `{{ }}` it contained.
pub(crate) fn eval_bool(node_id: &str, field: &str, value: Option<&Value>) -> Result<bool, ExecutionError> {
    match value {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => {
            let evaluated = crate::expr::evaluate(s)?;
            evaluated
                .as_bool()
                .ok_or_else(|| ExecutionError::Internal { message: format!("node '{node_id}': '{field}' did not evaluate to a boolean") })
        }
        Some(other) => Err(ExecutionError::Internal {
            message: format!("node '{node_id}': '{field}' must be a boolean or expression string, got {other}"),
        }),
        None => Err(ExecutionError::Internal { message: format!("node '{node_id}' has no '{field}' in config") }),
    }
}
