// SPDX-License-Identifier: MIT

//! The fixed filter catalog (§4.4).

use super::ast::{FilterCall, Literal};
use crate::errors::TemplateError;
use base64::Engine;
use serde_json::Value;

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Num(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Value::from(*n as i64),
        Literal::Num(n) => serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::Null,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(b) => !b,
        _ => false,
    }
}

fn as_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn apply(name_and_args: &FilterCall, value: Value) -> Result<Value, TemplateError> {
    let args = &name_and_args.args;
    match name_and_args.name.as_str() {
        "to_upper" => Ok(Value::String(as_display_string(&value).to_uppercase())),
        "to_lower" => Ok(Value::String(as_display_string(&value).to_lowercase())),
        "length" => match &value {
            Value::String(s) => Ok(Value::from(s.chars().count())),
            Value::Array(a) => Ok(Value::from(a.len())),
            Value::Object(o) => Ok(Value::from(o.len())),
            _ => Err(TemplateError::NotIndexable(format!("{value:?}"))),
        },
        "tojson" => Ok(Value::String(serde_json::to_string(&value).map_err(|e| {
            TemplateError::InvalidFilterArgument { filter: "tojson".to_string(), message: e.to_string() }
        })?)),
        "default_if_empty" => {
            if is_empty(&value) {
                Ok(args.first().map(literal_to_value).unwrap_or(Value::Null))
            } else {
                Ok(value)
            }
        }
        "int" => {
            let default = args.first().map(literal_to_value).unwrap_or(Value::from(0));
            Ok(match &value {
                Value::Number(n) => Value::from(n.as_f64().unwrap_or(0.0) as i64),
                Value::String(s) => s.trim().parse::<i64>().map(Value::from).unwrap_or(default),
                Value::Bool(b) => Value::from(*b as i64),
                _ => default,
            })
        }
        "float" => {
            let default = args.first().map(literal_to_value).unwrap_or(Value::from(0.0));
            Ok(match &value {
                Value::Number(n) => serde_json::Number::from_f64(n.as_f64().unwrap_or(0.0))
                    .map(Value::Number)
                    .unwrap_or(default),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(default),
                _ => default,
            })
        }
        "b64encode" => {
            let text = as_display_string(&value);
            Ok(Value::String(base64::engine::general_purpose::STANDARD.encode(text.as_bytes())))
        }
        "b64decode" => {
            let text = as_display_string(&value);
            let decoded = base64::engine::general_purpose::STANDARD.decode(text.as_bytes()).map_err(|e| {
                TemplateError::InvalidFilterArgument { filter: "b64decode".to_string(), message: e.to_string() }
            })?;
            Ok(Value::String(String::from_utf8_lossy(&decoded).to_string()))
        }
        "urlencode" => {
            let text = as_display_string(&value);
            Ok(Value::String(
                percent_encoding::utf8_percent_encode(&text, percent_encoding::NON_ALPHANUMERIC).to_string(),
            ))
        }
        "urldecode" => {
            let text = as_display_string(&value);
            let decoded = percent_encoding::percent_decode_str(&text)
                .decode_utf8()
                .map_err(|e| TemplateError::InvalidFilterArgument {
                    filter: "urldecode".to_string(),
                    message: e.to_string(),
                })?;
            Ok(Value::String(decoded.to_string()))
        }
        "format_date" => {
            let fmt = match args.first() {
                Some(Literal::Str(s)) => s.clone(),
                _ => {
                    return Err(TemplateError::InvalidFilterArgument {
                        filter: "format_date".to_string(),
                        message: "expects a format string argument".to_string(),
                    })
                }
            };
            let text = as_display_string(&value);
            let parsed = chrono::DateTime::parse_from_rfc3339(&text).map_err(|e| {
                TemplateError::InvalidFilterArgument { filter: "format_date".to_string(), message: e.to_string() }
            })?;
            Ok(Value::String(parsed.format(&fmt).to_string()))
        }
        other => Err(TemplateError::UnknownFilter(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Literal>) -> FilterCall {
        FilterCall { name: name.to_string(), args }
    }

    #[test]
    fn to_upper_and_to_lower() {
        assert_eq!(apply(&call("to_upper", vec![]), Value::String("ada".into())).unwrap(), Value::String("ADA".into()));
        assert_eq!(apply(&call("to_lower", vec![]), Value::String("ADA".into())).unwrap(), Value::String("ada".into()));
    }

    #[test]
    fn default_if_empty_substitutes_only_when_empty() {
        let result = apply(&call("default_if_empty", vec![Literal::Str("x".into())]), Value::String("".into())).unwrap();
        assert_eq!(result, Value::String("x".into()));
        let result = apply(&call("default_if_empty", vec![Literal::Str("x".into())]), Value::String("y".into())).unwrap();
        assert_eq!(result, Value::String("y".into()));
    }

    #[test]
    fn unknown_filter_errors() {
        let err = apply(&call("nope", vec![]), Value::Null).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownFilter(_)));
    }

    #[test]
    fn b64_round_trips() {
        let encoded = apply(&call("b64encode", vec![]), Value::String("hi".into())).unwrap();
        assert_eq!(encoded, Value::String("aGk=".into()));
        let decoded = apply(&call("b64decode", vec![]), encoded).unwrap();
        assert_eq!(decoded, Value::String("hi".into()));
    }
}
