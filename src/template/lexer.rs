// SPDX-License-Identifier: MIT

//! Splits raw template source into text runs and `{{ }}` / `{% %}` tags.
//! Expression grammar inside a tag is handled separately by the parser.

use crate::errors::TemplateError;

#[derive(Debug, Clone, PartialEq)]
pub enum RawToken {
    Text(String),
    /// Content between `{{` and `}}`, trimmed.
    ExprTag(String),
    /// Content between `{%` and `%}`, trimmed.
    BlockTag(String),
}

pub fn lex(source: &str) -> Result<Vec<RawToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut text_start = 0;

    while i < source.len() {
        if source[i..].starts_with("{{") || source[i..].starts_with("{%") {
            if i > text_start {
                tokens.push(RawToken::Text(source[text_start..i].to_string()));
            }
            let is_expr = source[i..].starts_with("{{");
            let close = if is_expr { "}}" } else { "%}" };
            let content_start = i + 2;
            let close_pos = source[content_start..].find(close).ok_or_else(|| {
                TemplateError::UnclosedBlock(if is_expr { "{{".to_string() } else { "{%".to_string() })
            })?;
            let content = source[content_start..content_start + close_pos].trim().to_string();
            tokens.push(if is_expr { RawToken::ExprTag(content) } else { RawToken::BlockTag(content) });
            i = content_start + close_pos + close.len();
            text_start = i;
        } else {
            // step by this char's byte width, not 1 — `source[i..]` above
            // requires `i` to land on a UTF-8 char boundary.
            let width = source[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            i += width;
        }
    }

    if text_start < source.len() {
        tokens.push(RawToken::Text(source[text_start..].to_string()));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_mixed_text_and_tags() {
        let tokens = lex("hi {{ name }}, {% if cond %}yes{% endif %}").unwrap();
        assert_eq!(
            tokens,
            vec![
                RawToken::Text("hi ".to_string()),
                RawToken::ExprTag("name".to_string()),
                RawToken::Text(", ".to_string()),
                RawToken::BlockTag("if cond".to_string()),
                RawToken::Text("yes".to_string()),
                RawToken::BlockTag("endif".to_string()),
            ]
        );
    }

    #[test]
    fn unclosed_tag_is_an_error() {
        let err = lex("hello {{ name").unwrap_err();
        assert!(matches!(err, TemplateError::UnclosedBlock(_)));
    }
}
