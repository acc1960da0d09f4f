// SPDX-License-Identifier: MIT

//! Parses `{{ }}` / `{% %}` tag bodies into [`Expr`] trees, and the full
//! token stream into the [`TemplateNode`] tree (§4.4).

use super::ast::{CompareOp, Expr, FilterCall, Literal, PathSegment, TemplateNode};
use super::lexer::{lex, RawToken};
use crate::errors::TemplateError;

pub fn parse(source: &str) -> Result<Vec<TemplateNode>, TemplateError> {
    let tokens = lex(source)?;
    let mut pos = 0;
    let (nodes, _) = parse_nodes(&tokens, &mut pos)?;
    Ok(nodes)
}

/// Parses a run of nodes until end-of-input or a block terminator
/// (`elif`/`else`/`endif`/`endfor`), which is left unconsumed so the caller
/// can branch on it.
fn parse_nodes(
    tokens: &[RawToken],
    pos: &mut usize,
) -> Result<(Vec<TemplateNode>, Option<String>), TemplateError> {
    let mut nodes = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            RawToken::Text(text) => {
                nodes.push(TemplateNode::Text(text.clone()));
                *pos += 1;
            }
            RawToken::ExprTag(content) => {
                nodes.push(TemplateNode::Interpolate(parse_filtered_expr(content)?));
                *pos += 1;
            }
            RawToken::BlockTag(content) => {
                let keyword = content.split_whitespace().next().unwrap_or("");
                match keyword {
                    "if" => {
                        *pos += 1;
                        nodes.push(parse_if(tokens, pos, content)?);
                    }
                    "for" => {
                        *pos += 1;
                        nodes.push(parse_for(tokens, pos, content)?);
                    }
                    "elif" | "else" | "endif" | "endfor" => {
                        return Ok((nodes, Some(keyword.to_string())));
                    }
                    other => {
                        return Err(TemplateError::Syntax {
                            position: *pos,
                            message: format!("unknown block tag '{other}'"),
                        })
                    }
                }
            }
        }
    }

    Ok((nodes, None))
}

fn parse_if(
    tokens: &[RawToken],
    pos: &mut usize,
    if_tag: &str,
) -> Result<TemplateNode, TemplateError> {
    let mut branches = Vec::new();
    let mut condition = parse_tag_condition(if_tag, "if")?;

    loop {
        let (body, terminator) = parse_nodes(tokens, pos)?;
        branches.push((condition.clone(), body));

        match terminator.as_deref() {
            Some("elif") => {
                let elif_tag = expect_block_tag(tokens, pos)?;
                condition = parse_tag_condition(&elif_tag, "elif")?;
                *pos += 1;
            }
            Some("else") => {
                *pos += 1;
                let (else_body, else_terminator) = parse_nodes(tokens, pos)?;
                if else_terminator.as_deref() != Some("endif") {
                    return Err(unterminated("if"));
                }
                *pos += 1;
                return Ok(TemplateNode::If { branches, else_branch: Some(else_body) });
            }
            Some("endif") => {
                *pos += 1;
                return Ok(TemplateNode::If { branches, else_branch: None });
            }
            _ => return Err(unterminated("if")),
        }
    }
}

fn parse_for(
    tokens: &[RawToken],
    pos: &mut usize,
    for_tag: &str,
) -> Result<TemplateNode, TemplateError> {
    let rest = for_tag.strip_prefix("for ").unwrap_or("").trim();
    let (alias, iter_text) = rest.split_once(" in ").ok_or_else(|| TemplateError::Syntax {
        position: *pos,
        message: "expected 'for <name> in <expr>'".to_string(),
    })?;
    let iterable = parse_filtered_expr(iter_text.trim())?;

    let (body, terminator) = parse_nodes(tokens, pos)?;
    if terminator.as_deref() != Some("endfor") {
        return Err(unterminated("for"));
    }
    *pos += 1;

    Ok(TemplateNode::For { alias: alias.trim().to_string(), iterable, body })
}

fn expect_block_tag(tokens: &[RawToken], pos: &mut usize) -> Result<String, TemplateError> {
    match tokens.get(*pos) {
        Some(RawToken::BlockTag(content)) => Ok(content.clone()),
        _ => Err(unterminated("if")),
    }
}

fn unterminated(block: &str) -> TemplateError {
    TemplateError::UnclosedBlock(block.to_string())
}

fn parse_tag_condition(tag: &str, keyword: &str) -> Result<Expr, TemplateError> {
    let rest = tag.strip_prefix(keyword).unwrap_or(tag).trim();
    parse_condition(rest)
}

// ---- expression tokenizer ----

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Num(f64),
    Dot,
    LBracket,
    RBracket,
    Pipe,
    LParen,
    RParen,
    Comma,
    CompareOp(CompareOp),
    And,
    Or,
    Not,
    True,
    False,
    None,
}

fn tokenize_expr(src: &str) -> Result<Vec<Tok>, TemplateError> {
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    let mut tokens = Vec::new();

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '.' => {
                tokens.push(Tok::Dot);
                i += 1;
            }
            '[' => {
                tokens.push(Tok::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Tok::RBracket);
                i += 1;
            }
            '|' => {
                tokens.push(Tok::Pipe);
                i += 1;
            }
            '(' => {
                tokens.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Tok::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Tok::Comma);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::CompareOp(CompareOp::Eq));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::CompareOp(CompareOp::Ne));
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::CompareOp(CompareOp::Le));
                i += 2;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::CompareOp(CompareOp::Ge));
                i += 2;
            }
            '<' => {
                tokens.push(Tok::CompareOp(CompareOp::Lt));
                i += 1;
            }
            '>' => {
                tokens.push(Tok::CompareOp(CompareOp::Gt));
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(TemplateError::Syntax {
                        position: i,
                        message: "unterminated string literal".to_string(),
                    });
                }
                i += 1;
                tokens.push(Tok::Str(s));
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text.parse::<f64>().map_err(|_| TemplateError::Syntax {
                    position: start,
                    message: format!("invalid number literal '{text}'"),
                })?;
                tokens.push(Tok::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    "true" | "True" => Tok::True,
                    "false" | "False" => Tok::False,
                    "none" | "None" | "null" => Tok::None,
                    _ => Tok::Ident(word),
                });
            }
            other => {
                return Err(TemplateError::Syntax {
                    position: i,
                    message: format!("unexpected character '{other}'"),
                })
            }
        }
    }

    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, tok: &Tok, context: &str) -> Result<(), TemplateError> {
        if self.next().as_ref() == Some(tok) {
            Ok(())
        } else {
            Err(TemplateError::Syntax { position: self.pos, message: format!("expected token in {context}") })
        }
    }

    // or_expr (and stays left-assoc via recursive descent)
    fn parse_or(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Tok::Or)) {
            self.next();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, TemplateError> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Some(Tok::And)) {
            self.next();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, TemplateError> {
        if matches!(self.peek(), Some(Tok::Not)) {
            self.next();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, TemplateError> {
        let left = self.parse_filtered()?;
        if let Some(Tok::CompareOp(op)) = self.peek().cloned() {
            self.next();
            let right = self.parse_filtered()?;
            return Ok(Expr::Compare(Box::new(left), op, Box::new(right)));
        }
        Ok(left)
    }

    fn parse_filtered(&mut self) -> Result<Expr, TemplateError> {
        let base = self.parse_primary()?;
        let mut filters = Vec::new();
        while matches!(self.peek(), Some(Tok::Pipe)) {
            self.next();
            let name = match self.next() {
                Some(Tok::Ident(name)) => name,
                _ => {
                    return Err(TemplateError::Syntax {
                        position: self.pos,
                        message: "expected filter name after '|'".to_string(),
                    })
                }
            };
            let mut args = Vec::new();
            if matches!(self.peek(), Some(Tok::LParen)) {
                self.next();
                if !matches!(self.peek(), Some(Tok::RParen)) {
                    loop {
                        args.push(self.parse_literal()?);
                        if matches!(self.peek(), Some(Tok::Comma)) {
                            self.next();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RParen, "filter argument list")?;
            }
            filters.push(FilterCall { name, args });
        }
        if filters.is_empty() {
            Ok(base)
        } else {
            Ok(Expr::Filtered(Box::new(base), filters))
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, TemplateError> {
        match self.next() {
            Some(Tok::Str(s)) => Ok(Literal::Str(s)),
            Some(Tok::Num(n)) => Ok(Literal::Num(n)),
            Some(Tok::True) => Ok(Literal::Bool(true)),
            Some(Tok::False) => Ok(Literal::Bool(false)),
            Some(Tok::None) => Ok(Literal::None),
            _ => Err(TemplateError::Syntax { position: self.pos, message: "expected a literal".to_string() }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
        match self.peek().cloned() {
            Some(Tok::Str(_) | Tok::Num(_) | Tok::True | Tok::False | Tok::None) => {
                Ok(Expr::Literal(self.parse_literal()?))
            }
            Some(Tok::Ident(_)) => Ok(Expr::Path(self.parse_path()?)),
            other => Err(TemplateError::Syntax {
                position: self.pos,
                message: format!("unexpected token {other:?}"),
            }),
        }
    }

    fn parse_path(&mut self) -> Result<Vec<PathSegment>, TemplateError> {
        let mut segments = Vec::new();
        match self.next() {
            Some(Tok::Ident(name)) => segments.push(PathSegment::Field(name)),
            _ => {
                return Err(TemplateError::Syntax {
                    position: self.pos,
                    message: "expected identifier".to_string(),
                })
            }
        }

        loop {
            match self.peek() {
                Some(Tok::Dot) => {
                    self.next();
                    match self.next() {
                        Some(Tok::Ident(name)) => segments.push(PathSegment::Field(name)),
                        _ => {
                            return Err(TemplateError::Syntax {
                                position: self.pos,
                                message: "expected identifier after '.'".to_string(),
                            })
                        }
                    }
                }
                Some(Tok::LBracket) => {
                    self.next();
                    match self.next() {
                        Some(Tok::Num(n)) => segments.push(PathSegment::Index(n as i64)),
                        Some(Tok::Str(s)) => segments.push(PathSegment::Field(s)),
                        _ => {
                            return Err(TemplateError::Syntax {
                                position: self.pos,
                                message: "expected index or key inside '[...]'".to_string(),
                            })
                        }
                    }
                    self.expect(&Tok::RBracket, "index access")?;
                }
                _ => break,
            }
        }

        Ok(segments)
    }
}

/// Parses an interpolation body (`{{ <this> }}`) or a `for` tag's iterable:
/// a path/literal optionally followed by pipe filters.
pub fn parse_filtered_expr(text: &str) -> Result<Expr, TemplateError> {
    let tokens = tokenize_expr(text)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.parse_filtered()?;
    if parser.pos != parser.tokens.len() {
        return Err(TemplateError::Syntax {
            position: parser.pos,
            message: "unexpected trailing tokens".to_string(),
        });
    }
    Ok(expr)
}

/// Parses an `if`/`elif` condition: full boolean grammar (`and`/`or`/`not`,
/// comparisons, filtered paths).
pub fn parse_condition(text: &str) -> Result<Expr, TemplateError> {
    let tokens = tokenize_expr(text)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(TemplateError::Syntax {
            position: parser.pos,
            message: "unexpected trailing tokens in condition".to_string(),
        });
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_with_filter() {
        let expr = parse_filtered_expr("variables.name | to_upper").unwrap();
        assert_eq!(
            expr,
            Expr::Filtered(
                Box::new(Expr::Path(vec![
                    PathSegment::Field("variables".to_string()),
                    PathSegment::Field("name".to_string())
                ])),
                vec![FilterCall { name: "to_upper".to_string(), args: vec![] }]
            )
        );
    }

    #[test]
    fn parses_comparison_condition() {
        let expr = parse_condition("variables.count > 0").unwrap();
        assert!(matches!(expr, Expr::Compare(_, CompareOp::Gt, _)));
    }

    #[test]
    fn parses_if_for_blocks() {
        let nodes = parse("{% if variables.ok %}yes{% else %}no{% endif %}").unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0], TemplateNode::If { .. }));

        let nodes = parse("{% for x in variables.items %}{{ x }}{% endfor %}").unwrap();
        assert!(matches!(nodes[0], TemplateNode::For { .. }));
    }
}
