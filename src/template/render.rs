// SPDX-License-Identifier: MIT

//! Walks the AST against a rendering environment and produces output (§4.4).

use super::ast::{CompareOp, Expr, Literal, PathSegment, TemplateNode};
use super::filters;
use super::parser::parse;
use crate::errors::TemplateError;
use serde_json::{Map, Value};

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Num(n) => number_value(*n),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::Null,
    }
}

/// `serde_json::Number::from_f64` always keeps a trailing `.0` for whole
/// numbers, so a literal `1` would render as `"1.0"`. Use an integer
/// `Number` whenever the value is exactly representable as one.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn path_string(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            PathSegment::Field(f) => f.clone(),
            PathSegment::Index(i) => i.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn lookup_path(segments: &[PathSegment], env: &Value) -> Result<Value, TemplateError> {
    let mut current = env;
    let mut resolved = Vec::new();

    for segment in segments {
        resolved.push(segment.clone());
        match segment {
            PathSegment::Field(name) => match current.get(name) {
                Some(v) => current = v,
                None => {
                    let available = current
                        .as_object()
                        .map(|m| m.keys().cloned().collect())
                        .unwrap_or_default();
                    return Err(TemplateError::UndefinedVariable {
                        path: path_string(&resolved),
                        available,
                    });
                }
            },
            PathSegment::Index(i) => match current.as_array().and_then(|a| {
                let idx = if *i < 0 { a.len() as i64 + i } else { *i };
                usize::try_from(idx).ok().and_then(|idx| a.get(idx))
            }) {
                Some(v) => current = v,
                None => {
                    return Err(TemplateError::NotIndexable(path_string(&resolved)));
                }
            },
        }
    }

    Ok(current.clone())
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

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn compare(op: &CompareOp, left: &Value, right: &Value) -> Result<bool, TemplateError> {
    if let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) {
        return Ok(match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        });
    }
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        _ => match (left.as_str(), right.as_str()) {
            (Some(a), Some(b)) => Ok(match op {
                CompareOp::Lt => a < b,
                CompareOp::Le => a <= b,
                CompareOp::Gt => a > b,
                CompareOp::Ge => a >= b,
                CompareOp::Eq | CompareOp::Ne => unreachable!(),
            }),
            _ => Err(TemplateError::TypeError(format!(
                "cannot order-compare {left:?} and {right:?}"
            ))),
        },
    }
}

fn eval_expr(expr: &Expr, env: &Value) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(lit) => Ok(literal_to_value(lit)),
        Expr::Path(segments) => lookup_path(segments, env),
        Expr::Filtered(base, calls) => {
            let mut value = eval_expr(base, env)?;
            for call in calls {
                value = filters::apply(call, value)?;
            }
            Ok(value)
        }
        Expr::Compare(left, op, right) => {
            let l = eval_expr(left, env)?;
            let r = eval_expr(right, env)?;
            Ok(Value::Bool(compare(op, &l, &r)?))
        }
        Expr::And(left, right) => {
            let l = eval_expr(left, env)?;
            if !truthy(&l) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval_expr(right, env)?)))
        }
        Expr::Or(left, right) => {
            let l = eval_expr(left, env)?;
            if truthy(&l) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval_expr(right, env)?)))
        }
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval_expr(inner, env)?))),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn value_to_output_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn render_nodes(nodes: &[TemplateNode], env: &Value) -> Result<String, TemplateError> {
    let mut out = String::new();
    for node in nodes {
        match node {
            TemplateNode::Text(text) => out.push_str(text),
            TemplateNode::Interpolate(expr) => {
                let value = eval_expr(expr, env)?;
                let rendered = value_to_output_string(&value);
                out.push_str(&escape_html(&rendered));
            }
            TemplateNode::If { branches, else_branch } => {
                let mut matched = false;
                for (condition, body) in branches {
                    if truthy(&eval_expr(condition, env)?) {
                        out.push_str(&render_nodes(body, env)?);
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    if let Some(body) = else_branch {
                        out.push_str(&render_nodes(body, env)?);
                    }
                }
            }
            TemplateNode::For { alias, iterable, body } => {
                let items = eval_expr(iterable, env)?;
                let items = items.as_array().cloned().unwrap_or_default();
                let mut scoped_env = env.as_object().cloned().unwrap_or_default();
                for item in items {
                    scoped_env.insert(alias.clone(), item);
                    out.push_str(&render_nodes(body, &Value::Object(scoped_env.clone()))?);
                }
            }
        }
    }
    Ok(out)
}

/// Parses and renders a template string against `env` (§4.4).
pub fn render_string(source: &str, env: &Value) -> Result<String, TemplateError> {
    let nodes = parse(source)?;
    render_nodes(&nodes, env)
}

/// Recursively renders every string inside `value` (§4.3): maps and lists are
/// rebuilt with rendered children, scalars other than strings pass through
/// unchanged.
pub fn render_value(value: &Value, env: &Value) -> Result<Value, TemplateError> {
    match value {
        Value::String(s) => Ok(Value::String(render_string(s, env)?)),
        Value::Array(items) => {
            let mut rendered = Vec::with_capacity(items.len());
            for item in items {
                rendered.push(render_value(item, env)?);
            }
            Ok(Value::Array(rendered))
        }
        Value::Object(map) => {
            let mut rendered = Map::with_capacity(map.len());
            for (k, v) in map {
                rendered.insert(k.clone(), render_value(v, env)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_nested_path() {
        let env = json!({"variables": {"name": "ada"}});
        assert_eq!(render_string("hello {{ variables.name }}", &env).unwrap(), "hello ada");
    }

    #[test]
    fn undefined_variable_lists_siblings() {
        let env = json!({"variables": {"name": "ada", "age": 3}});
        let err = render_string("{{ variables.missing }}", &env).unwrap_err();
        match err {
            TemplateError::UndefinedVariable { path, available } => {
                assert_eq!(path, "variables.missing");
                assert!(available.contains(&"name".to_string()));
                assert!(available.contains(&"age".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn if_elif_else_picks_first_truthy_branch() {
        let env = json!({"variables": {"n": 2}});
        let out = render_string(
            "{% if variables.n == 1 %}one{% elif variables.n == 2 %}two{% else %}other{% endif %}",
            &env,
        )
        .unwrap();
        assert_eq!(out, "two");
    }

    #[test]
    fn for_loop_renders_each_item_with_alias() {
        let env = json!({"variables": {"items": ["a", "b", "c"]}});
        let out = render_string("{% for x in variables.items %}[{{ x }}]{% endfor %}", &env).unwrap();
        assert_eq!(out, "[a][b][c]");
    }

    #[test]
    fn autoescapes_html_by_default() {
        let env = json!({"variables": {"name": "<b>ada</b>"}});
        let out = render_string("{{ variables.name }}", &env).unwrap();
        assert_eq!(out, "&lt;b&gt;ada&lt;/b&gt;");
    }

    #[test]
    fn render_value_passes_scalars_through() {
        let env = json!({});
        let out = render_value(&json!({"n": 3, "items": [1, "{{ 1 }}"]}), &env).unwrap();
        assert_eq!(out["n"], json!(3));
        assert_eq!(out["items"][0], json!(1));
        assert_eq!(out["items"][1], json!("1"));
    }
}
