// SPDX-License-Identifier: MIT

use super::ast::{ArithOp, CompareOp, Expr};
use super::parser::parse;
use crate::errors::ExpressionError;
use serde_json::{Map, Number, Value};

/// Evaluates a safe-expression string against no external bindings — the
/// grammar has no name lookup, so there is nothing to bind (§4.5). Template
/// substitution happens upstream, before this ever sees the string.
pub fn evaluate(source: &str) -> Result<Value, ExpressionError> {
    if let Some(fast) = fast_path_bool(source) {
        return Ok(Value::Bool(fast));
    }
    let ast = parse(source)?;
    eval_expr(&ast)
}

/// §4.5: "Direct booleans and the literal strings `true`/`false`
/// (case-insensitive) are fast-pathed."
fn fast_path_bool(source: &str) -> Option<bool> {
    match source.trim() {
        s if s.eq_ignore_ascii_case("true") => Some(true),
        s if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn eval_expr(expr: &Expr) -> Result<Value, ExpressionError> {
    match expr {
        Expr::Num(n) => Ok(Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::None => Ok(Value::Null),
        Expr::List(items) | Expr::Tuple(items) => {
            Ok(Value::Array(items.iter().map(eval_expr).collect::<Result<_, _>>()?))
        }
        Expr::Dict(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                let key = eval_expr(k)?;
                let key = value_to_key(&key)?;
                map.insert(key, eval_expr(v)?);
            }
            Ok(Value::Object(map))
        }
        Expr::Neg(inner) => {
            let v = as_number(&eval_expr(inner)?)?;
            Ok(num(-v))
        }
        Expr::Pos(inner) => {
            let v = as_number(&eval_expr(inner)?)?;
            Ok(num(v))
        }
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval_expr(inner)?))),
        Expr::And(left, right) => {
            let l = eval_expr(left)?;
            if !truthy(&l) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval_expr(right)?)))
        }
        Expr::Or(left, right) => {
            let l = eval_expr(left)?;
            if truthy(&l) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval_expr(right)?)))
        }
        Expr::Arith(left, op, right) => eval_arith(&eval_expr(left)?, *op, &eval_expr(right)?),
        Expr::Compare(first, chain) => {
            let mut left = eval_expr(first)?;
            for (op, rhs_expr) in chain {
                let right = eval_expr(rhs_expr)?;
                if !eval_compare(&left, *op, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

fn value_to_key(value: &Value) -> Result<String, ExpressionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ExpressionError::TypeError(format!("invalid dict key: {other:?}"))),
    }
}

fn num(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn as_number(value: &Value) -> Result<f64, ExpressionError> {
    value.as_f64().ok_or_else(|| ExpressionError::TypeError(format!("expected a number, got {value:?}")))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn eval_arith(left: &Value, op: ArithOp, right: &Value) -> Result<Value, ExpressionError> {
    if op == ArithOp::Add {
        if let (Value::String(a), Value::String(b)) = (left, right) {
            return Ok(Value::String(format!("{a}{b}")));
        }
    }
    let a = as_number(left)?;
    let b = as_number(right)?;
    match op {
        ArithOp::Add => Ok(num(a + b)),
        ArithOp::Sub => Ok(num(a - b)),
        ArithOp::Mul => Ok(num(a * b)),
        ArithOp::Div => {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(num(a / b))
            }
        }
        ArithOp::Mod => {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(num(a % b))
            }
        }
    }
}

fn eval_compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool, ExpressionError> {
    match op {
        CompareOp::Eq | CompareOp::Is => Ok(left == right),
        CompareOp::Ne | CompareOp::IsNot => Ok(left != right),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                return Ok(match op {
                    CompareOp::Lt => a < b,
                    CompareOp::Le => a <= b,
                    CompareOp::Gt => a > b,
                    CompareOp::Ge => a >= b,
                    _ => unreachable!(),
                });
            }
            match (left.as_str(), right.as_str()) {
                (Some(a), Some(b)) => Ok(match op {
                    CompareOp::Lt => a < b,
                    CompareOp::Le => a <= b,
                    CompareOp::Gt => a > b,
                    CompareOp::Ge => a >= b,
                    _ => unreachable!(),
                }),
                _ => Err(ExpressionError::TypeError(format!("cannot order-compare {left:?} and {right:?}"))),
            }
        }
        CompareOp::In | CompareOp::NotIn => {
            let found = match right {
                Value::Array(items) => items.contains(left),
                Value::Object(map) => left.as_str().is_some_and(|k| map.contains_key(k)),
                Value::String(s) => left.as_str().is_some_and(|needle| s.contains(needle)),
                other => {
                    return Err(ExpressionError::TypeError(format!(
                        "right-hand side of 'in' must be a collection, got {other:?}"
                    )))
                }
            };
            Ok(if op == CompareOp::In { found } else { !found })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fast_path_booleans() {
        assert_eq!(evaluate("true").unwrap(), json!(true));
        assert_eq!(evaluate("FALSE").unwrap(), json!(false));
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), json!(7.0));
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), json!(9.0));
        assert_eq!(evaluate("1 < 2").unwrap(), json!(true));
    }

    #[test]
    fn chained_comparison_is_left_to_right() {
        assert_eq!(evaluate("1 < 2 < 3").unwrap(), json!(true));
        assert_eq!(evaluate("1 < 2 < 1").unwrap(), json!(false));
    }

    #[test]
    fn membership_and_identity() {
        assert_eq!(evaluate("2 in [1, 2, 3]").unwrap(), json!(true));
        assert_eq!(evaluate("5 not in [1, 2, 3]").unwrap(), json!(true));
        assert_eq!(evaluate("none is none").unwrap(), json!(true));
    }

    #[test]
    fn division_by_zero_errors() {
        assert!(matches!(evaluate("1 / 0").unwrap_err(), ExpressionError::DivisionByZero));
    }

    #[test]
    fn name_lookup_is_rejected_as_unsafe() {
        assert!(matches!(evaluate("some_name").unwrap_err(), ExpressionError::Unsafe(_)));
    }

    #[test]
    fn attribute_access_is_rejected_as_unsafe() {
        assert!(matches!(evaluate("\"x\".upper").unwrap_err(), ExpressionError::Unsafe(_)));
    }

    #[test]
    fn boolean_short_circuit() {
        assert_eq!(evaluate("false and (1 / 0 == 0)").unwrap(), json!(false));
    }
}
